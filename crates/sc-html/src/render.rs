use crate::tags::{TagKind, TagStack};
use crate::RenderError;
use sc_reader::{Call, Diagnostic, Reader, Token, TokenKind};
use std::fmt;

/// Render a whole SC document into the sink as an HTML fragment.
///
/// One linear pass: tokens are pulled from the reader and applied to the
/// tag stack until `End` closes everything down to the sentinel. The first
/// reader error or structural error aborts the render; open tags are left
/// unclosed and the error carries the full diagnostic.
///
/// `path` and `file_name` only feed diagnostics, they are never opened.
pub fn render<W: fmt::Write>(
    source: &str,
    path: &str,
    file_name: &str,
    out: &mut W,
) -> Result<(), RenderError> {
    let mut reader = Reader::new(source, path, file_name);
    let mut tags = TagStack::new(out);
    tags.push(TagKind::Article)?;

    loop {
        let token = reader.next_token();
        match &token.kind {
            TokenKind::End => break,

            TokenKind::Error(_) => {
                return Err(Diagnostic::from_token(&token, None).into());
            }

            TokenKind::Text(text) => {
                // Open an implicit paragraph when text lands right under a
                // section or article tag
                if tags.at_section_level() && !text.chars().all(char::is_whitespace) {
                    tags.push(TagKind::Paragraph)?;
                }
                tags.write_escaped(text)?;
            }

            TokenKind::EscapedBackslash(_) => {
                if tags.at_section_level() {
                    tags.push(TagKind::Paragraph)?;
                }
                tags.write_raw("\\")?;
            }

            TokenKind::Call(call) => apply_call(&token, call, &mut tags)?,
        }
    }

    while tags.depth() > 0 {
        tags.pop()?;
    }
    Ok(())
}

/// Render into a fresh string.
pub fn render_to_string(source: &str, path: &str, file_name: &str) -> Result<String, RenderError> {
    let mut out = String::new();
    render(source, path, file_name, &mut out)?;
    Ok(out)
}

/// Apply one command call to the tag stack, writing its markup.
fn apply_call<W: fmt::Write>(
    token: &Token<'_>,
    call: &Call<'_>,
    tags: &mut TagStack<'_, W>,
) -> Result<(), RenderError> {
    match call.name {
        "section" => {
            let heading = require_block(token, call)?;
            tags.rise_to_section_level(2, heading)
        }
        "subsection" => {
            let heading = require_block(token, call)?;
            tags.rise_to_section_level(3, heading)
        }

        "paragraph" => tags.open_block(TagKind::Paragraph),
        "ordered_list" => tags.open_block(TagKind::OrderedList),
        "unordered_list" => tags.open_block(TagKind::UnorderedList),
        "horizontal_list" => tags.open_block(TagKind::HorizontalList),

        "table" => {
            tags.open_block(TagKind::TableWrapper)?;
            tags.push(TagKind::Table)?;
            if let Some(caption) = call.block {
                tags.write_in_tag("caption", caption)?;
            }
            Ok(())
        }

        "item" => {
            // A new item closes the previous one
            if matches!(
                tags.top(),
                Some(TagKind::ListItem | TagKind::TableColumn | TagKind::TableHeadingColumn)
            ) {
                tags.pop()?;
            }
            match tags.top() {
                Some(TagKind::OrderedList | TagKind::UnorderedList | TagKind::HorizontalList) => {
                    tags.push(TagKind::ListItem)
                }
                Some(TagKind::TableRow) => tags.push(TagKind::TableColumn),
                _ => Err(structural(
                    token,
                    "You can only open an \\item in a table row or list",
                )),
            }
        }

        "hitem" => {
            if matches!(
                tags.top(),
                Some(TagKind::TableColumn | TagKind::TableHeadingColumn)
            ) {
                tags.pop()?;
            }
            if tags.top() != Some(TagKind::TableRow) {
                return Err(structural(
                    token,
                    "You can only open an \\hitem in a table row",
                ));
            }
            tags.push(TagKind::TableHeadingColumn)
        }

        "row" => {
            // A new row closes the open cell and the previous row
            if matches!(
                tags.top(),
                Some(TagKind::TableColumn | TagKind::TableHeadingColumn)
            ) {
                tags.pop()?;
            }
            if tags.top() == Some(TagKind::TableRow) {
                tags.pop()?;
            }
            if tags.top() != Some(TagKind::Table) {
                return Err(structural(token, "You can only open a \\row in a table"));
            }
            tags.push(TagKind::TableRow)
        }

        "html" => {
            let raw = require_block(token, call)?;
            tags.rise_to_lowest_section()?;
            tags.write_raw(raw)
        }

        "code" => {
            let block = require_block(token, call)?;
            tags.rise_to_lowest_section()?;
            tags.write_raw("<pre><code>")?;
            // A code block usually opens with a newline right after the
            // brace; inside <pre> it would show as a blank first line
            tags.write_escaped(block.strip_prefix('\n').unwrap_or(block))?;
            tags.write_raw("</code></pre>\n")
        }

        "quote" => {
            let block = require_block(token, call)?;
            tags.rise_to_lowest_section()?;
            tags.write_in_tag("blockquote", block)
        }

        // Inline commands leave the stack alone
        "bold" => tags.write_in_tag("b", require_block(token, call)?),
        "italic" => tags.write_in_tag("i", require_block(token, call)?),
        "inline" => tags.write_in_tag("code", require_block(token, call)?),

        "link" => {
            let text = require_block(token, call)?;
            tags.write_raw("<a")?;
            let mut found_url = false;
            for arg in &call.args {
                if arg.key == "url" {
                    found_url = true;
                    tags.write_attribute("href", arg.value)?;
                } else {
                    tags.write_attribute(arg.key, arg.value)?;
                }
            }
            if !found_url {
                return Err(structural(token, "Missing required url parameter in link"));
            }
            tags.write_raw(">")?;
            tags.write_escaped(text)?;
            tags.write_raw("</a>")
        }

        "image" => {
            tags.rise_to_lowest_section()?;
            tags.write_raw("<img")?;
            let mut found_url = false;
            for arg in &call.args {
                if arg.key == "url" {
                    found_url = true;
                    tags.write_attribute("src", arg.value)?;
                } else {
                    tags.write_attribute(arg.key, arg.value)?;
                }
            }
            if !found_url {
                return Err(structural(token, "Missing required url parameter in image"));
            }
            tags.write_raw(">\n")
        }

        "info" => {
            tags.rise_to_lowest_section()?;
            if tags.top() != Some(TagKind::Article) {
                return Err(structural(
                    token,
                    "Info command should be at the beginning of the file",
                ));
            }
            for arg in &call.args {
                if arg.key == "title" {
                    tags.write_in_tag("h1", arg.value)?;
                }
            }
            Ok(())
        }

        _ => Err(structural(token, "Unknown command")),
    }
}

/// The block argument of a command that cannot do without one.
fn require_block<'a>(token: &Token<'_>, call: &Call<'a>) -> Result<&'a str, RenderError> {
    match call.block {
        Some(block) => Ok(block),
        None => Err(RenderError::Markup(Diagnostic::from_token(
            token,
            Some(&format!("{} commands require a block", call.name)),
        ))),
    }
}

/// A structural error reported at the offending token's location.
fn structural(token: &Token<'_>, message: &str) -> RenderError {
    RenderError::Markup(Diagnostic::from_token(token, Some(message)))
}
