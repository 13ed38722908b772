use crate::RenderError;
use std::fmt;

/// Hard cap on open tags. Exceeding it is a render error.
pub const MAX_TAG_DEPTH: usize = 128;

/// The closed set of structural HTML elements the renderer can have open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Article,
    Section,
    Paragraph,
    OrderedList,
    UnorderedList,
    HorizontalList,
    /// Wrapper div around tables so wide tables can scroll horizontally.
    TableWrapper,
    Table,
    ListItem,
    TableRow,
    TableColumn,
    TableHeadingColumn,
}

impl TagKind {
    /// Text inside the angle brackets when the tag opens.
    pub fn open_text(self) -> &'static str {
        match self {
            TagKind::Article => "article",
            TagKind::Section => "section",
            TagKind::Paragraph => "p",
            TagKind::OrderedList => "ol",
            TagKind::UnorderedList => "ul",
            TagKind::HorizontalList => "ul class=\"horizlist\"",
            TagKind::TableWrapper => "div class=\"tablediv\"",
            TagKind::Table => "table",
            TagKind::ListItem => "li",
            TagKind::TableRow => "tr",
            TagKind::TableColumn => "td",
            TagKind::TableHeadingColumn => "th",
        }
    }

    /// Text inside the angle brackets when the tag closes. Only the two
    /// attribute-carrying kinds differ from their open spelling.
    pub fn close_text(self) -> &'static str {
        match self {
            TagKind::HorizontalList => "ul",
            TagKind::TableWrapper => "div",
            other => other.open_text(),
        }
    }

    /// Article and Section are the tags `section_depth` counts and the
    /// tags block commands rise to.
    pub fn is_section_level(self) -> bool {
        matches!(self, TagKind::Article | TagKind::Section)
    }
}

/// The renderer's push-down state: currently-open structural elements plus
/// the output sink every decision writes to.
///
/// An empty stack is the permanent root sentinel. `section_depth` always
/// equals the number of Article/Section entries on the stack.
pub struct TagStack<'w, W: fmt::Write> {
    stack: Vec<TagKind>,
    section_depth: usize,
    out: &'w mut W,
}

impl<'w, W: fmt::Write> TagStack<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        Self {
            stack: Vec::new(),
            section_depth: 0,
            out,
        }
    }

    pub fn top(&self) -> Option<TagKind> {
        self.stack.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn at_section_level(&self) -> bool {
        matches!(self.top(), Some(tag) if tag.is_section_level())
    }

    /// Open a tag: write its opening markup and push it.
    pub fn push(&mut self, tag: TagKind) -> Result<(), RenderError> {
        if self.stack.len() >= MAX_TAG_DEPTH {
            return Err(RenderError::TooDeep);
        }
        writeln!(self.out, "<{}>", tag.open_text())?;
        self.stack.push(tag);
        if tag.is_section_level() {
            self.section_depth += 1;
        }
        Ok(())
    }

    /// Close the topmost tag: pop it and write its closing markup. A pop on
    /// the root sentinel is a no-op.
    pub fn pop(&mut self) -> Result<(), RenderError> {
        if let Some(tag) = self.stack.pop() {
            writeln!(self.out, "</{}>", tag.close_text())?;
            if tag.is_section_level() {
                self.section_depth -= 1;
            }
        }
        Ok(())
    }

    /// Close tags until a Section or Article is on top.
    pub fn rise_to_lowest_section(&mut self) -> Result<(), RenderError> {
        while let Some(tag) = self.top() {
            if tag.is_section_level() {
                break;
            }
            self.pop()?;
        }
        Ok(())
    }

    /// Close back to the enclosing section, then open the given tag.
    pub fn open_block(&mut self, tag: TagKind) -> Result<(), RenderError> {
        self.rise_to_lowest_section()?;
        self.push(tag)
    }

    /// Close deeper structure, open any missing intermediate sections so
    /// the section depth matches `level`, then write the heading.
    pub fn rise_to_section_level(&mut self, level: usize, heading: &str) -> Result<(), RenderError> {
        while self.section_depth > level - 1 {
            self.pop()?;
        }
        while self.section_depth < level {
            self.push(TagKind::Section)?;
        }
        self.write_in_tag("h1", heading)
    }

    pub fn write_raw(&mut self, text: &str) -> Result<(), RenderError> {
        self.out.write_str(text)?;
        Ok(())
    }

    pub fn write_escaped(&mut self, text: &str) -> Result<(), RenderError> {
        crate::write_escaped(self.out, text)?;
        Ok(())
    }

    /// Escaped text wrapped in a non-structural tag, e.g. `<b>`.
    pub fn write_in_tag(&mut self, tag: &str, text: &str) -> Result<(), RenderError> {
        writeln!(self.out, "<{tag}>")?;
        self.write_escaped(text)?;
        writeln!(self.out, "</{tag}>")?;
        Ok(())
    }

    /// An HTML attribute with the value written raw.
    pub fn write_attribute(&mut self, key: &str, value: &str) -> Result<(), RenderError> {
        write!(self.out, " {key}=\"{value}\"")?;
        Ok(())
    }
}
