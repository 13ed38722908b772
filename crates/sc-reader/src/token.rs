/// Hard cap on keyword arguments per command call. Exceeding it is a
/// reader error, not a truncation.
pub const MAX_ARGS: usize = 32;

/// A position in source text, tracking line and column for error reporting.
/// Both start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourcePos {
    pub line: usize,
    pub column: usize,
}

impl SourcePos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// One `key = value` argument of a command call. Both sides are borrowed
/// slices of the input; string values carry their raw bytes with no escape
/// processing, number values are whatever run of digits, `.` and `-` was
/// present (no numeric validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arg<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// A command call: `\name`, `\name(args)`, `\name{block}` or
/// `\name(args){block}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<'a> {
    pub name: &'a str,
    pub args: Vec<Arg<'a>>,
    pub block: Option<&'a str>,
}

impl<'a> Call<'a> {
    /// Value of the first argument with the given key, if any.
    pub fn arg(&self, key: &str) -> Option<&'a str> {
        self.args.iter().find(|a| a.key == key).map(|a| a.value)
    }
}

/// Token classification for SC source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// A maximal run of plain text, up to the next backslash.
    Text(&'a str),
    /// The two-character `\\` literal.
    EscapedBackslash(&'a str),
    /// A command call.
    Call(Call<'a>),
    /// End of input. Sticky: every later read returns it again.
    End,
    /// Reader failure. Sticky: every later read returns it again and no
    /// further input is consumed.
    Error(&'static str),
}

/// A token produced by the SC reader.
///
/// Positions bracket the token's full text. The file identity is carried on
/// every token so a diagnostic can be produced from the token alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub start: SourcePos,
    pub end: SourcePos,
    pub path: &'a str,
    pub file_name: &'a str,
}
