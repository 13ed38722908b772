use crate::token::{Token, TokenKind};

/// A human-readable failure report for one SC document.
///
/// Owns copies of the file identity and positions so it can outlive the
/// parse that produced it. This is the one place token data is copied out
/// of the input buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Error while reading SC file: {file_name}\n\
     Path was: {path}\n\
     Error: {message}\n\
     Starting location: line {start_line}, col {start_column}\n\
     Ending location:   line {end_line}, col {end_column}\n"
)]
pub struct Diagnostic {
    pub message: String,
    pub file_name: String,
    pub path: String,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Diagnostic {
    /// Build a diagnostic from a token's position and file identity.
    ///
    /// With no override, the message is the token's own error text (empty
    /// for non-error tokens). Renderers pass an override to report
    /// structural errors at the offending token's location.
    pub fn from_token(token: &Token<'_>, override_message: Option<&str>) -> Self {
        let message = match (override_message, &token.kind) {
            (Some(message), _) => message.to_string(),
            (None, TokenKind::Error(message)) => (*message).to_string(),
            (None, _) => String::new(),
        };

        Self {
            message,
            file_name: token.file_name.to_string(),
            path: token.path.to_string(),
            start_line: token.start.line,
            start_column: token.start.column,
            end_line: token.end.line,
            end_column: token.end.column,
        }
    }
}
