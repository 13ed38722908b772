//! SC Reader
//!
//! Pulls typed tokens out of an SC markup document, one per call.
//! SC is a regular language (commands cannot nest), so lexing and parsing
//! collapse into a single pass and no syntax tree is ever built. Plain text
//! comes out in big chunks; `\command(args){block}` calls come out as one
//! token carrying borrowed slices of the input.
//!
//! # Example
//!
//! ```
//! use sc_reader::{Reader, TokenKind};
//!
//! let tokens = Reader::tokenize("", "posts/empty.sc", "empty.sc");
//! assert_eq!(tokens.len(), 1); // Just End
//! assert_eq!(tokens[0].kind, TokenKind::End);
//! ```

pub mod diagnostic;
pub mod reader;
pub mod token;

pub use diagnostic::Diagnostic;
pub use reader::Reader;
pub use token::{Arg, Call, SourcePos, Token, TokenKind, MAX_ARGS};
