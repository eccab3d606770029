//! Editing session over a [`Document`].

use std::fmt;

use super::document::{Block, Document, Line, Marks};

type ChangeCallback = Box<dyn FnMut(&str) + Send>;

/// Rich-text editor state for one journal entry form.
///
/// The cursor always sits at the end of the document: typed text, toggles and
/// inserted images apply there. Every edit reports the new markup through the
/// `on_change` callback; replacing the content from outside does not.
///
/// Loaded markup is reported verbatim until the first edit.
pub struct RichTextEditor {
    document: Document,
    loaded: Option<String>,
    marks: Marks,
    on_change: Option<ChangeCallback>,
}

impl Default for RichTextEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RichTextEditor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RichTextEditor")
            .field("document", &self.document)
            .field("marks", &self.marks)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl RichTextEditor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            document: Document::new(),
            loaded: None,
            marks: Marks::PLAIN,
            on_change: None,
        }
    }

    #[must_use]
    pub fn with_content(markup: &str) -> Self {
        Self {
            document: Document::parse(markup),
            loaded: Some(markup.to_string()),
            ..Self::new()
        }
    }

    /// Register the callback receiving the markup after each edit.
    pub fn on_change(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    #[must_use]
    pub fn markup(&self) -> String {
        self.loaded
            .clone()
            .unwrap_or_else(|| self.document.to_markup())
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Replace the whole document when `markup` differs from the current
    /// content. Returns whether anything was replaced.
    pub fn set_content(&mut self, markup: &str) -> bool {
        if markup == self.markup() {
            return false;
        }
        self.document = Document::parse(markup);
        self.loaded = Some(markup.to_string());
        self.marks = Marks::PLAIN;
        true
    }

    /// Empty the document without notifying.
    pub fn clear(&mut self) {
        self.document = Document::new();
        self.loaded = None;
        self.marks = Marks::PLAIN;
    }

    /// Type `text` at the cursor with the active marks.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.push_at_cursor(text, self.marks);
        self.notify();
    }

    /// Start a new paragraph, or a new item when inside a list.
    pub fn new_line(&mut self) {
        let blocks = self.document.blocks_mut();
        match blocks.last_mut() {
            Some(Block::BulletList(items) | Block::OrderedList { items, .. }) => {
                items.push(Line::new());
            }
            _ => blocks.push(Block::Paragraph(Line::new())),
        }
        self.notify();
    }

    pub fn toggle_bold(&mut self) -> bool {
        self.marks.bold = !self.marks.bold;
        self.marks.bold
    }

    pub fn toggle_italic(&mut self) -> bool {
        self.marks.italic = !self.marks.italic;
        self.marks.italic
    }

    #[must_use]
    pub const fn is_bold(&self) -> bool {
        self.marks.bold
    }

    #[must_use]
    pub const fn is_italic(&self) -> bool {
        self.marks.italic
    }

    /// Wrap the current paragraph or heading in a bullet list, or lift the
    /// current item out of its list. A numbered list becomes a bullet list.
    /// Returns whether the cursor is now in a bullet list.
    pub fn toggle_bullet_list(&mut self) -> bool {
        let blocks = self.document.blocks_mut();
        let in_list = match blocks.pop() {
            Some(Block::BulletList(mut items)) => {
                let item = items.pop().unwrap_or_default();
                if !items.is_empty() {
                    blocks.push(Block::BulletList(items));
                }
                blocks.push(Block::Paragraph(item));
                false
            }
            Some(Block::OrderedList { items, .. }) => {
                blocks.push(Block::BulletList(items));
                true
            }
            Some(Block::Paragraph(line) | Block::Heading { line, .. }) => {
                if let Some(Block::BulletList(items)) = blocks.last_mut() {
                    items.push(line);
                } else {
                    blocks.push(Block::BulletList(vec![line]));
                }
                true
            }
            Some(
                other @ (Block::Blockquote(_)
                | Block::CodeBlock(_)
                | Block::Rule
                | Block::Image { .. }),
            ) => {
                blocks.push(other);
                blocks.push(Block::BulletList(vec![Line::new()]));
                true
            }
            None => {
                blocks.push(Block::BulletList(vec![Line::new()]));
                true
            }
        };
        self.notify();
        in_list
    }

    #[must_use]
    pub fn in_bullet_list(&self) -> bool {
        matches!(self.document.blocks().last(), Some(Block::BulletList(_)))
    }

    /// Insert an already hosted image at the cursor.
    ///
    /// Blank URLs are ignored and `false` returned.
    pub fn insert_image(&mut self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }
        let blocks = self.document.blocks_mut();
        // An empty trailing line is where the cursor sits; the image replaces it.
        match blocks.last_mut() {
            Some(Block::Paragraph(line)) if line.is_empty() => {
                blocks.pop();
            }
            Some(Block::BulletList(items) | Block::OrderedList { items, .. })
                if items.last().is_some_and(Line::is_empty) =>
            {
                items.pop();
                if items.is_empty() {
                    blocks.pop();
                }
            }
            _ => {}
        }
        blocks.push(Block::Image {
            src: url.to_string(),
            alt: None,
        });
        self.notify();
        true
    }

    fn push_at_cursor(&mut self, text: &str, marks: Marks) {
        let blocks = self.document.blocks_mut();
        match blocks.last_mut() {
            Some(Block::Paragraph(line) | Block::Heading { line, .. }) => line.push(text, marks),
            Some(Block::CodeBlock(code)) => code.push_str(text),
            Some(Block::BulletList(items) | Block::OrderedList { items, .. }) => {
                if let Some(item) = items.last_mut() {
                    item.push(text, marks);
                } else {
                    let mut item = Line::new();
                    item.push(text, marks);
                    items.push(item);
                }
            }
            Some(Block::Blockquote(_) | Block::Rule | Block::Image { .. }) | None => {
                let mut line = Line::new();
                line.push(text, marks);
                blocks.push(Block::Paragraph(line));
            }
        }
    }

    fn notify(&mut self) {
        self.loaded = None;
        let markup = self.document.to_markup();
        if let Some(callback) = self.on_change.as_mut() {
            callback(&markup);
        }
    }
}
