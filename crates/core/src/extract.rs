//! Conversion of generated HTML notes into the note model.
//!
//! Only `h1`, `h2`, `h3`, `p` and `ul` are recognised as blocks. Any other
//! element is skipped, but its children are still walked, so wrappers such
//! as `html`, `body` or `div` are transparent.

use crate::style::declares_red_color;
use crate::types::{Block, BlockKind, NoteDocument};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse whitespace runs (including newlines) into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Regex matching a response wrapped in a Markdown code fence.
static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[A-Za-z]*[ \t]*\r?\n?(.*?)\s*```\s*$").unwrap());

/// Label the generator puts in front of callout text.
const NOTE_LABEL: &str = "NOTE:";

/// Markup elements the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    H1,
    H2,
    H3,
    P,
    Ul,
    Li,
    Other,
}

impl Tag {
    fn of(element: &ElementRef<'_>) -> Self {
        match element.value().name() {
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "p" => Tag::P,
            "ul" => Tag::Ul,
            "li" => Tag::Li,
            _ => Tag::Other,
        }
    }
}

/// Extracts a [`NoteDocument`] from HTML-like markup.
#[derive(Debug, Clone, Default)]
pub struct NoteExtractor;

impl NoteExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Parse markup and return its blocks in document order.
    ///
    /// Never fails: unrecognised or malformed markup simply yields fewer blocks.
    pub fn extract(&self, raw_markup: &str) -> NoteDocument {
        let markup = strip_code_fences(raw_markup);
        let html = Html::parse_document(markup);
        let mut doc = NoteDocument::new();

        self.walk(html.root_element(), &mut doc);

        log::debug!("Extracted {} blocks from {} bytes of markup", doc.len(), raw_markup.len());
        doc
    }

    fn walk(&self, element: ElementRef<'_>, doc: &mut NoteDocument) {
        for child in element.children().filter_map(ElementRef::wrap) {
            match Tag::of(&child) {
                Tag::H1 => self.push_text(doc, BlockKind::Heading, child),
                Tag::H2 => self.push_text(doc, BlockKind::Subheading, child),
                Tag::H3 => self.push_text(doc, BlockKind::Subsubheading, child),
                Tag::P => self.push_paragraph(doc, child),
                Tag::Ul => self.push_list(doc, child, 0),
                Tag::Li | Tag::Other => self.walk(child, doc),
            }
        }
    }

    fn push_text(&self, doc: &mut NoteDocument, kind: BlockKind, element: ElementRef<'_>) {
        doc.push(Block::new(kind, element_text(element, false)));
    }

    fn push_paragraph(&self, doc: &mut NoteDocument, element: ElementRef<'_>) {
        let text = element_text(element, false);
        if is_note_callout(element) {
            let stripped = text.replace(NOTE_LABEL, "");
            doc.push(Block::note(collapse_whitespace(&stripped)));
        } else {
            doc.push(Block::new(BlockKind::Paragraph, text));
        }
    }

    /// Emit one list item per direct `li`, each followed by the items of its
    /// first directly nested `ul` one level deeper. Further sibling lists
    /// inside the same `li` are not visited.
    fn push_list(&self, doc: &mut NoteDocument, list: ElementRef<'_>, level: u32) {
        let items = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| Tag::of(el) == Tag::Li);

        for item in items {
            doc.push(Block::list_item(element_text(item, true), level));

            let nested = item
                .children()
                .filter_map(ElementRef::wrap)
                .find(|el| Tag::of(el) == Tag::Ul);
            if let Some(nested) = nested {
                self.push_list(doc, nested, level + 1);
            }
        }
    }
}

/// Convenience wrapper around [`NoteExtractor::extract`].
pub fn extract(raw_markup: &str) -> NoteDocument {
    NoteExtractor::new().extract(raw_markup)
}

/// Remove an outer Markdown code fence (```` ```html ... ``` ````) if present.
pub fn strip_code_fences(raw: &str) -> &str {
    match CODE_FENCE_REGEX.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw,
    }
}

/// Whether a paragraph carries a bold span styled red.
fn is_note_callout(paragraph: ElementRef<'_>) -> bool {
    paragraph
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "b")
        .any(|el| el.value().attr("style").is_some_and(declares_red_color))
}

/// Text content of an element with whitespace collapsed and NFC-normalized.
/// With `skip_lists`, nested `ul`/`ol` subtrees are left out.
fn element_text(element: ElementRef<'_>, skip_lists: bool) -> String {
    let mut raw = String::new();
    collect_text(element, skip_lists, &mut raw);
    collapse_whitespace(&raw).nfc().collect()
}

fn collect_text(element: ElementRef<'_>, skip_lists: bool, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if skip_lists && (name == "ul" || name == "ol") {
                // Keep words on either side of a skipped list apart.
                out.push(' ');
                continue;
            }
            collect_text(el, skip_lists, out);
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_COLLAPSE_REGEX.replace_all(text, " ").trim().to_string()
}
