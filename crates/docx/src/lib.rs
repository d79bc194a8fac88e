//! Word (OOXML) export for study notes.
//!
//! Word export only ever sees flattened text: headings and lists arrive as
//! plain lines, and only "NOTE:" lines get character formatting.

pub mod document;

pub use document::{Run, WordDocument, WordParagraph};

use document::TITLE_STYLE;
use notes_core::flatten::{is_note_line, non_empty_lines};
use notes_core::style::note_color;
use notes_core::{notes_title, Result};

/// Content type of the exported file.
pub const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Renders flattened notes to `.docx` bytes.
#[derive(Debug, Clone, Default)]
pub struct WordRenderer;

impl WordRenderer {
    /// Create a new Word renderer.
    pub fn new() -> Self {
        Self
    }

    /// Build the document model: a title heading, then one paragraph per line.
    pub fn document(&self, topic: &str, text: &str) -> WordDocument {
        let title = notes_title(topic);
        let mut doc = WordDocument::new(title.clone());
        doc.add_paragraph(WordParagraph::styled(TITLE_STYLE, vec![Run::plain(title)]));

        for line in non_empty_lines(text) {
            let mut run = Run::plain(line);
            if is_note_line(line) {
                run.bold = true;
                run.color = note_color();
            }
            doc.add_paragraph(WordParagraph::new(vec![run]));
        }
        doc
    }

    /// Render flattened notes to a complete `.docx` file.
    pub fn render(&self, topic: &str, text: &str) -> Result<Vec<u8>> {
        let doc = self.document(topic, text);
        log::debug!("Rendering Word document for '{}' with {} paragraphs", topic, doc.paragraphs.len());
        doc.to_docx()
    }
}

/// Render flattened notes to `.docx` bytes with the default renderer.
pub fn render_word(topic: &str, text: &str) -> Result<Vec<u8>> {
    WordRenderer::new().render(topic, text)
}
