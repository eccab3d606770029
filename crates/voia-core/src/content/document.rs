//! Block/inline document tree and its HTML rendering.

use std::fmt::{self, Write as _};

use super::parser;

/// Inline formatting applied to a run of text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub code: bool,
}

impl Marks {
    pub const PLAIN: Self = Self {
        bold: false,
        italic: false,
        strike: false,
        code: false,
    };

    pub const BOLD: Self = Self {
        bold: true,
        ..Self::PLAIN
    };

    pub const ITALIC: Self = Self {
        italic: true,
        ..Self::PLAIN
    };

    /// Active marks, outermost first.
    fn active(self) -> Vec<Mark> {
        [
            (self.bold, Mark::Bold),
            (self.code, Mark::Code),
            (self.italic, Mark::Italic),
            (self.strike, Mark::Strike),
        ]
        .into_iter()
        .filter_map(|(on, mark)| on.then_some(mark))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Bold,
    Code,
    Italic,
    Strike,
}

impl Mark {
    const fn tag(self) -> &'static str {
        match self {
            Self::Bold => "strong",
            Self::Code => "code",
            Self::Italic => "em",
            Self::Strike => "s",
        }
    }
}

/// A run of text sharing the same marks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inline {
    pub text: String,
    pub marks: Marks,
}

impl Inline {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::PLAIN,
        }
    }

    pub fn marked(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }
}

/// A line of inline runs: a paragraph, a heading or one list item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line(Vec<Inline>);

impl Line {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append text, merging with the previous run when marks match.
    pub fn push(&mut self, text: &str, marks: Marks) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.0.last_mut() {
            if last.marks == marks {
                last.text.push_str(text);
                return;
            }
        }
        self.0.push(Inline::marked(text, marks));
    }

    #[must_use]
    pub fn runs(&self) -> &[Inline] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.0.iter().map(|run| run.text.as_str()).collect()
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        let mut line = Self::new();
        line.push(text, Marks::PLAIN);
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// May be empty: a blank line in the editor.
    Paragraph(Line),
    Heading { level: u8, line: Line },
    BulletList(Vec<Line>),
    OrderedList { start: u32, items: Vec<Line> },
    Blockquote(Vec<Block>),
    CodeBlock(String),
    Rule,
    Image { src: String, alt: Option<String> },
}

impl Block {
    fn collect_images(&self, urls: &mut Vec<String>) {
        match self {
            Self::Image { src, .. } => urls.push(src.clone()),
            Self::Blockquote(blocks) => {
                for block in blocks {
                    block.collect_images(urls);
                }
            }
            _ => {}
        }
    }

    fn collect_text(&self, lines: &mut Vec<String>) {
        match self {
            Self::Paragraph(line) | Self::Heading { line, .. } => lines.push(line.text()),
            Self::BulletList(items) => {
                lines.extend(items.iter().map(|item| format!("- {}", item.text())));
            }
            Self::OrderedList { start, items } => {
                lines.extend(
                    (*start..)
                        .zip(items)
                        .map(|(number, item)| format!("{number}. {}", item.text())),
                );
            }
            Self::Blockquote(blocks) => {
                let mut quoted = Vec::new();
                for block in blocks {
                    block.collect_text(&mut quoted);
                }
                lines.extend(quoted.into_iter().map(|line| format!("> {line}")));
            }
            Self::CodeBlock(code) => lines.push(code.clone()),
            Self::Rule | Self::Image { .. } => {}
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Self::Paragraph(line) => {
                out.push_str("<p>");
                render_line(out, line);
                out.push_str("</p>");
            }
            Self::Heading { level, line } => {
                let _ = write!(out, "<h{level}>");
                render_line(out, line);
                let _ = write!(out, "</h{level}>");
            }
            Self::BulletList(items) => {
                out.push_str("<ul>");
                render_items(out, items);
                out.push_str("</ul>");
            }
            Self::OrderedList { start, items } => {
                if *start == 1 {
                    out.push_str("<ol>");
                } else {
                    let _ = write!(out, "<ol start=\"{start}\">");
                }
                render_items(out, items);
                out.push_str("</ol>");
            }
            Self::Blockquote(blocks) => {
                out.push_str("<blockquote>");
                for block in blocks {
                    block.render(out);
                }
                out.push_str("</blockquote>");
            }
            Self::CodeBlock(code) => {
                out.push_str("<pre><code>");
                out.push_str(&escape_text(code));
                out.push_str("</code></pre>");
            }
            Self::Rule => out.push_str("<hr>"),
            Self::Image { src, alt } => {
                let _ = write!(out, "<img src=\"{}\"", escape_attr(src));
                if let Some(alt) = alt {
                    let _ = write!(out, " alt=\"{}\"", escape_attr(alt));
                }
                out.push('>');
            }
        }
    }
}

/// Rich-text content of a journal entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    #[must_use]
    pub const fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Parse HTML markup. Never fails: unknown tags are dropped and their
    /// text kept.
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        Self {
            blocks: parser::parse_blocks(markup),
        }
    }

    #[must_use]
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Image sources in document order, including quoted ones.
    #[must_use]
    pub fn image_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        for block in &self.blocks {
            block.collect_images(&mut urls);
        }
        urls
    }

    /// Text without formatting, one line per paragraph, heading or list item.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            block.collect_text(&mut lines);
        }
        lines.join("\n")
    }

    /// Render as HTML markup.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            block.render(&mut out);
        }
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

fn render_items(out: &mut String, items: &[Line]) {
    for item in items {
        out.push_str("<li><p>");
        render_line(out, item);
        out.push_str("</p></li>");
    }
}

/// Marks shared with the previous run stay open, so
/// `<strong>Be <em>still</em></strong>` renders as it was written.
fn render_line(out: &mut String, line: &Line) {
    let mut open: Vec<Mark> = Vec::new();
    for run in line.runs() {
        let wanted = run.marks.active();
        let keep = open
            .iter()
            .zip(&wanted)
            .take_while(|(open, wanted)| open == wanted)
            .count();
        for mark in open.drain(keep..).rev() {
            let _ = write!(out, "</{}>", mark.tag());
        }
        for mark in &wanted[keep..] {
            let _ = write!(out, "<{}>", mark.tag());
        }
        open.extend_from_slice(&wanted[keep..]);
        out.push_str(&escape_text(&run.text).replace('\n', "<br>"));
    }
    for mark in open.into_iter().rev() {
        let _ = write!(out, "</{}>", mark.tag());
    }
}

pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
