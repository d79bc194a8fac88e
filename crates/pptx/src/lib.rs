//! PowerPoint (PPTX) export for study notes.
//!
//! Notes are split into title-and-content slides by [`deck`], serialized by
//! [`package`], and can be read back with [`PptxReader`].

pub mod deck;
pub mod package;
pub mod reader;

pub use deck::{heading_title, Deck, Slide, SlideParagraph};
pub use reader::{PptxReader, ReadParagraph, ReadSlide};

use notes_core::{NotesInput, Result};

/// Content type of the exported file.
pub const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Renders notes to `.pptx` bytes.
#[derive(Debug, Clone, Default)]
pub struct SlideRenderer;

impl SlideRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Split notes into slides without serializing them.
    pub fn deck(&self, topic: &str, input: NotesInput<'_>) -> Deck {
        Deck::from_notes(topic, input)
    }

    /// Render notes to a complete `.pptx` file.
    pub fn render(&self, topic: &str, input: NotesInput<'_>) -> Result<Vec<u8>> {
        let deck = self.deck(topic, input);
        log::debug!("Rendering slides for '{}' with {} slides", topic, deck.slides.len());
        deck.to_pptx()
    }
}

/// Render notes to `.pptx` bytes with the default renderer.
pub fn render_slides(topic: &str, input: NotesInput<'_>) -> Result<Vec<u8>> {
    SlideRenderer::new().render(topic, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notes_core::ooxml::PackageReader;
    use notes_core::{Block, BlockKind, NoteDocument};
    use std::io::Cursor;

    fn read_back(bytes: Vec<u8>) -> Vec<ReadSlide> {
        PptxReader::new().read(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_render_structured_round_trip() {
        let doc = NoteDocument::from_blocks([
            Block::new(BlockKind::Paragraph, "Lead-in"),
            Block::new(BlockKind::Heading, "Algebra"),
            Block::new(BlockKind::Subheading, "Terms"),
            Block::note("remember signs"),
            Block::list_item("Term A", 0),
            Block::list_item("Sub A1", 1),
            Block::new(BlockKind::Heading, "Geometry"),
        ]);
        let bytes = render_slides("Maths", NotesInput::Structured(&doc)).unwrap();
        let slides = read_back(bytes);

        assert_eq!(slides.len(), 3);
        assert_eq!(slides[0].title.as_deref(), Some("Notes on Maths"));
        assert_eq!(slides[0].body[0].text, "Lead-in");

        let algebra = &slides[1];
        assert_eq!(algebra.number, 2);
        assert_eq!(algebra.title.as_deref(), Some("Algebra"));
        assert_eq!(algebra.body[0].text, "Terms");
        assert!(algebra.body[0].bold);
        assert_eq!(algebra.body[0].size_pt, Some(16));

        assert_eq!(algebra.body[1].text, "NOTE: remember signs");
        assert!(algebra.body[1].bold);
        assert_eq!(algebra.body[1].color.as_deref(), Some("FF0000"));

        assert_eq!(algebra.body[2].level, 0);
        assert_eq!(algebra.body[3].level, 1);
        assert!(!algebra.body[3].bold);
        assert_eq!(algebra.body[3].size_pt, Some(12));

        assert_eq!(slides[2].title.as_deref(), Some("Geometry"));
        assert!(slides[2].body.is_empty());
    }

    #[test]
    fn test_render_flat_round_trip() {
        let text = "INTRODUCTION\nnote: see above\n• Term A\n## Next part\nDone";
        let slides = read_back(render_slides("Algebra", NotesInput::Flat(text)).unwrap());

        let titles: Vec<_> = slides.iter().map(|s| s.title.clone().unwrap_or_default()).collect();
        assert_eq!(titles, vec!["INTRODUCTION", "Next part"]);
        assert_eq!(slides[0].body[0].text, "note: see above");
        assert!(!slides[0].body[0].bold);
        assert_eq!(slides[0].body[1].level, 1);
    }

    #[test]
    fn test_package_parts() {
        let bytes = render_slides("Empty", NotesInput::Flat("")).unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));

        let mut package = PackageReader::new(Cursor::new(bytes.clone())).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/_rels/slide1.xml.rels",
            "docProps/core.xml",
        ] {
            assert!(package.has_part(part), "missing part {}", part);
        }
        assert!(!package.has_part("ppt/slides/slide2.xml"));

        let presentation = package.read_part("ppt/presentation.xml").unwrap();
        assert!(presentation.contains(r#"<p:sldId id="256" r:id="rId2"/>"#));
        assert!(presentation.contains(r#"id="2147483648""#));

        let slides = read_back(bytes);
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].title.as_deref(), Some("Notes on Empty"));
        assert!(slides[0].body.is_empty());
    }

    #[test]
    fn test_slide_order_past_nine() {
        let blocks = (1..=12).map(|i| Block::new(BlockKind::Heading, format!("Slide {}", i)));
        let doc = NoteDocument::from_blocks(blocks);
        let slides = read_back(render_slides("T", NotesInput::Structured(&doc)).unwrap());

        let titles: Vec<_> = slides.iter().map(|s| s.title.clone().unwrap_or_default()).collect();
        let expected: Vec<_> = (1..=12).map(|i| format!("Slide {}", i)).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn test_escaped_text_survives() {
        let doc = NoteDocument::from_blocks([Block::new(BlockKind::Heading, "A & B <C>")]);
        let slides = read_back(render_slides("T", NotesInput::Structured(&doc)).unwrap());
        assert_eq!(slides[0].title.as_deref(), Some("A & B <C>"));
    }
}
