//! SC HTML Renderer
//!
//! Streams the token output of `sc-reader` straight into HTML. There is no
//! intermediate tree: a push-down automaton over a closed set of structural
//! tag kinds decides, token by token, which elements open and close, and
//! every decision writes its markup immediately. The result is a well-formed
//! HTML fragment (an `<article>` with its contents), not a full page.
//!
//! ```
//! let html = sc_html::render_to_string("Hello", "posts/hello.sc", "hello.sc").unwrap();
//! assert_eq!(html, "<article>\n<p>\nHello</p>\n</article>\n");
//! ```

pub mod render;
pub mod tags;

pub use render::{render, render_to_string};
pub use tags::{TagKind, MAX_TAG_DEPTH};

use sc_reader::Diagnostic;
use std::fmt;

/// Rendering failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A reader error or a structural error in the document, with the full
    /// file/position report.
    #[error(transparent)]
    Markup(#[from] Diagnostic),

    /// The document tried to nest deeper than the fixed tag-stack capacity.
    #[error("Too many nested tags (limit is {})", MAX_TAG_DEPTH)]
    TooDeep,

    /// The output sink refused a write.
    #[error("Output sink rejected a write")]
    Sink(#[from] fmt::Error),
}

/// Write text with the HTML special characters escaped.
///
/// Note this covers exactly `"`, `&`, `<` and `>`; everything else passes
/// through untouched.
pub fn write_escaped<W: fmt::Write>(out: &mut W, text: &str) -> fmt::Result {
    for ch in text.chars() {
        match ch {
            '"' => out.write_str("&quot;")?,
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            _ => out.write_char(ch)?,
        }
    }
    Ok(())
}

/// Escape into a fresh string.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    write_escaped(&mut out, text).expect("writing to a String cannot fail");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escapes_the_four_specials() {
        assert_eq!(escape_html("a \"b\" & <c>"), "a &quot;b&quot; &amp; &lt;c&gt;");
    }

    #[test]
    fn test_everything_else_passes_through() {
        assert_eq!(escape_html("héllo 'world' \\ {x}"), "héllo 'world' \\ {x}");
    }

    #[test]
    fn test_escaping_without_specials_is_identity() {
        let text = "plain text, no specials at all\n";
        assert_eq!(escape_html(text), text);
        // And therefore idempotent on its own output
        assert_eq!(escape_html(&escape_html(text)), text);
    }
}
