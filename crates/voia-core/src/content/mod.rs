//! Rich-text content of journal entries.
//!
//! Entry content is stored as an HTML markup string. [`Document`] is the
//! parsed form and [`RichTextEditor`] the editing session the journal form
//! owns.

mod document;
mod editor;
mod parser;

pub use document::{Block, Document, Inline, Line, Marks};
pub use editor::RichTextEditor;

/// Image URLs referenced by stored markup, in document order.
#[must_use]
pub fn image_urls(markup: &str) -> Vec<String> {
    Document::parse(markup).image_urls()
}
