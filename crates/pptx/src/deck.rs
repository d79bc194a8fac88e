//! Slide deck model and the rules that split notes into slides.
//!
//! A heading starts a new slide titled with its text; everything after it
//! goes into that slide's body until the next heading. Content that arrives
//! before any heading lands on a default "Notes on {topic}" slide.

use notes_core::flatten::{is_note_line, non_empty_lines, NOTE_PREFIX};
use notes_core::style::{apply_style, note_color, paragraph_level};
use notes_core::{notes_title, Block, BlockKind, NoteDocument, NotesInput, Rgb};

/// Body font size for subheadings, in points.
pub const SUBHEADING_SIZE: u32 = 16;
/// Body font size for sub-subheadings, in points.
pub const SUBSUBHEADING_SIZE: u32 = 14;
/// Body font size for everything else, in points.
pub const BODY_SIZE: u32 = 12;

/// Lines at least this many characters long are never headings.
const MAX_HEADING_CHARS: usize = 120;
/// All-caps lines shorter than this are not headings.
const MIN_CAPS_HEADING_CHARS: usize = 3;

/// One paragraph in a slide's body text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideParagraph {
    pub text: String,
    pub level: u8,
    pub bold: bool,
    pub size_pt: u32,
    pub color: Option<Rgb>,
}

impl SlideParagraph {
    /// Plain body text at the standard size.
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: 0,
            bold: false,
            size_pt: BODY_SIZE,
            color: None,
        }
    }

    /// Bold text at the given size.
    pub fn bold(text: impl Into<String>, size_pt: u32) -> Self {
        Self {
            bold: true,
            size_pt,
            ..Self::body(text)
        }
    }

    /// Bold red callout at the standard size.
    pub fn note(text: impl Into<String>) -> Self {
        Self {
            color: note_color(),
            ..Self::bold(text, BODY_SIZE)
        }
    }

    /// Body text indented to a list level; an unusable level falls back to 0.
    pub fn indented(text: impl Into<String>, level: u32) -> Self {
        Self {
            level: apply_style("level", paragraph_level(level)).unwrap_or(0),
            ..Self::body(text)
        }
    }
}

/// A title-and-content slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub title: String,
    pub body: Vec<SlideParagraph>,
}

impl Slide {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: Vec::new(),
        }
    }
}

/// An ordered set of slides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    pub title: String,
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Split notes into slides.
    pub fn from_notes(topic: &str, input: NotesInput<'_>) -> Self {
        let mut builder = DeckBuilder::new(topic);
        match input {
            NotesInput::Structured(doc) => builder.add_document(doc),
            NotesInput::Flat(text) => builder.add_text(text),
        }
        builder.finish()
    }
}

struct DeckBuilder {
    default_title: String,
    slides: Vec<Slide>,
}

impl DeckBuilder {
    fn new(topic: &str) -> Self {
        Self {
            default_title: notes_title(topic),
            slides: Vec::new(),
        }
    }

    fn start_slide(&mut self, title: impl Into<String>) {
        self.slides.push(Slide::new(title));
    }

    /// Append to the current slide, creating the default slide first if needed.
    fn push(&mut self, paragraph: SlideParagraph) {
        if self.slides.is_empty() {
            let title = self.default_title.clone();
            self.start_slide(title);
        }
        if let Some(slide) = self.slides.last_mut() {
            slide.body.push(paragraph);
        }
    }

    fn add_document(&mut self, doc: &NoteDocument) {
        for block in doc {
            self.add_block(block);
        }
    }

    fn add_block(&mut self, block: &Block) {
        let text = block.trimmed_text();
        if text.is_empty() {
            return;
        }

        match block.kind {
            BlockKind::Heading => self.start_slide(text),
            BlockKind::Subheading => self.push(SlideParagraph::bold(text, SUBHEADING_SIZE)),
            BlockKind::Subsubheading => self.push(SlideParagraph::bold(text, SUBSUBHEADING_SIZE)),
            BlockKind::Paragraph => self.push(SlideParagraph::body(text)),
            BlockKind::Note => self.push(SlideParagraph::note(format!("{} {}", NOTE_PREFIX, text))),
            BlockKind::ListItem => self.push(SlideParagraph::indented(text, block.list_level())),
        }
    }

    fn add_text(&mut self, text: &str) {
        for line in non_empty_lines(text) {
            if let Some(title) = heading_title(line) {
                self.start_slide(title);
            } else if is_note_line(line) {
                self.push(SlideParagraph::note(line));
            } else if line.starts_with('•') || line.starts_with('-') {
                self.push(SlideParagraph::indented(line, 1));
            } else {
                self.push(SlideParagraph::body(line));
            }
        }
    }

    /// Close the deck; an empty deck still gets the default slide.
    fn finish(mut self) -> Deck {
        if self.slides.is_empty() {
            let title = self.default_title.clone();
            self.start_slide(title);
        }
        Deck {
            title: self.default_title,
            slides: self.slides,
        }
    }
}

/// Decide whether a plain-text line is a slide heading, returning its title.
///
/// Checked in order, first match wins: a `"## "` prefix, an all-caps line of
/// 3 to 119 characters, then a line under 120 characters ending in `':'`.
pub fn heading_title(line: &str) -> Option<String> {
    if let Some(rest) = line.strip_prefix("## ") {
        return Some(rest.trim().to_string());
    }

    let chars = line.chars().count();
    if is_all_caps(line) && (MIN_CAPS_HEADING_CHARS..MAX_HEADING_CHARS).contains(&chars) {
        return Some(line.to_string());
    }

    if line.ends_with(':') && chars < MAX_HEADING_CHARS {
        return Some(line.trim_end_matches(':').trim().to_string());
    }

    None
}

/// At least one cased character and no lowercase ones.
fn is_all_caps(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}
