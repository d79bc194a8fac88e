//! PDF export for study notes.
//!
//! Notes are turned into a story of styled paragraphs (see [`layout`]) and
//! drawn with the DejaVu Sans faces embedded from `fonts/`.

pub mod fonts;
pub mod layout;

use std::collections::BTreeSet;

use fonts::{font_file, FontMetrics};
use layout::{layout, Face, Flowable, PageGeometry, Paragraph, ParagraphStyle, Span};
use notes_core::flatten::{is_note_line, non_empty_lines, BULLET, NOTE_PREFIX};
use notes_core::style::note_color;
use notes_core::{notes_title, Block, BlockKind, Error, NoteDocument, NotesInput, Result};
use printpdf::{Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

/// Content type of the exported file.
pub const CONTENT_TYPE: &str = "application/pdf";

/// Left indent per list nesting level, in points.
pub const LIST_INDENT: f32 = 12.0;

/// Space after the title, in points.
const TITLE_SPACER: f32 = 12.0;

/// Space after every other paragraph, in points.
const PARAGRAPH_SPACER: f32 = 6.0;

/// Renders notes to PDF bytes.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    geometry: PageGeometry,
}

impl PdfRenderer {
    /// Create a renderer for A4 pages with one-inch margins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Build the paragraph story for the given notes.
    pub fn story(&self, topic: &str, input: NotesInput<'_>) -> Vec<Flowable> {
        let mut story = vec![
            Flowable::Paragraph(Paragraph::plain(notes_title(topic), ParagraphStyle::TITLE)),
            Flowable::Spacer(TITLE_SPACER),
        ];

        match input {
            NotesInput::Structured(doc) => story_from_document(doc, &mut story),
            NotesInput::Flat(text) => story_from_text(text, &mut story),
        }
        story
    }

    /// Render notes to a complete PDF file.
    pub fn render(&self, topic: &str, input: NotesInput<'_>) -> Result<Vec<u8>> {
        let story = self.story(topic, input);
        let metrics = FontMetrics::bundled()?;
        warn_missing_glyphs(topic, &story, &metrics);
        let pages = layout(&story, &self.geometry, &metrics);
        log::debug!("Rendering PDF for '{}' across {} pages", topic, pages.len());

        let width = to_mm(self.geometry.width);
        let height = to_mm(self.geometry.height);
        let (doc, first_page, first_layer) =
            PdfDocument::new(notes_title(topic), width, height, "Notes".to_string());
        let fonts = Fonts::load(&doc)?;

        for (index, placed) in pages.iter().enumerate() {
            let (page, layer) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(width, height, "Notes")
            };
            let layer = doc.get_page(page).get_layer(layer);

            for text in placed {
                let (r, g, b) = text.color.unwrap_or(notes_core::Rgb::BLACK).to_unit();
                layer.set_fill_color(Color::Rgb(printpdf::Rgb::new(r, g, b, None)));
                layer.use_text(
                    text.text.clone(),
                    text.font_size,
                    to_mm(text.x),
                    to_mm(text.y),
                    fonts.get(text.face),
                );
            }
        }

        doc.save_to_bytes()
            .map_err(|e| Error::PdfError(format!("Failed to serialize PDF: {}", e)))
    }
}

/// Render notes to PDF bytes with the default renderer.
pub fn render_pdf(topic: &str, input: NotesInput<'_>) -> Result<Vec<u8>> {
    PdfRenderer::new().render(topic, input)
}

fn story_from_document(doc: &NoteDocument, story: &mut Vec<Flowable>) {
    for block in doc {
        if let Some(paragraph) = block_paragraph(block) {
            story.push(Flowable::Paragraph(paragraph));
            story.push(Flowable::Spacer(PARAGRAPH_SPACER));
        }
    }
}

fn block_paragraph(block: &Block) -> Option<Paragraph> {
    let text = block.trimmed_text();
    if text.is_empty() {
        return None;
    }

    let paragraph = match block.kind {
        BlockKind::Heading => Paragraph::plain(text, ParagraphStyle::HEADING1),
        BlockKind::Subheading => Paragraph::plain(text, ParagraphStyle::HEADING2),
        BlockKind::Subsubheading => Paragraph::plain(text, ParagraphStyle::HEADING3),
        BlockKind::Paragraph => Paragraph::plain(text, ParagraphStyle::NORMAL),
        BlockKind::Note => Paragraph::with_spans(
            vec![
                Span::new(NOTE_PREFIX, Face::Bold).colored(note_color()),
                Span::new(format!(" {}", text), Face::Regular),
            ],
            ParagraphStyle::NORMAL,
        ),
        BlockKind::ListItem => {
            Paragraph::plain(format!("{} {}", BULLET, text), ParagraphStyle::NORMAL)
                .indented(LIST_INDENT * block.list_level() as f32)
        }
    };
    Some(paragraph)
}

/// Text-only path: no headings or lists, only note lines are highlighted.
fn story_from_text(text: &str, story: &mut Vec<Flowable>) {
    for line in non_empty_lines(text) {
        let paragraph = if is_note_line(line) {
            Paragraph::with_spans(
                vec![Span::new(line, Face::Bold).colored(note_color())],
                ParagraphStyle::NORMAL,
            )
        } else {
            Paragraph::plain(line, ParagraphStyle::NORMAL)
        };
        story.push(Flowable::Paragraph(paragraph));
        story.push(Flowable::Spacer(PARAGRAPH_SPACER));
    }
}

/// Text the embedded fonts cannot draw is left out of the page; say so.
fn warn_missing_glyphs(topic: &str, story: &[Flowable], metrics: &FontMetrics) {
    let missing: BTreeSet<char> = story
        .iter()
        .filter_map(|f| match f {
            Flowable::Paragraph(p) => Some(p),
            Flowable::Spacer(_) => None,
        })
        .flat_map(|p| &p.spans)
        .flat_map(|span| metrics.missing_glyphs(&span.text, span.face))
        .collect();
    if !missing.is_empty() {
        let chars: String = missing.into_iter().collect();
        log::warn!("PDF for '{}' has characters without a glyph: {}", topic, chars);
    }
}

fn to_mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

/// The embedded font faces used by the story.
struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    bold_oblique: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let add = |face: Face| {
            doc.add_external_font(font_file(face))
                .map_err(|e| Error::PdfError(format!("Failed to embed {:?} font: {}", face, e)))
        };
        Ok(Self {
            regular: add(Face::Regular)?,
            bold: add(Face::Bold)?,
            bold_oblique: add(Face::BoldOblique)?,
        })
    }

    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::BoldOblique => &self.bold_oblique,
        }
    }
}
