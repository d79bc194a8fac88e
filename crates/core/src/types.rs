//! Domain types for representing generated notes.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a note block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Main title (`h1`).
    Heading,
    /// Section title (`h2`).
    Subheading,
    /// Sub-section title (`h3`).
    Subsubheading,
    /// Body text.
    Paragraph,
    /// Highlighted callout, rendered bold red with a "NOTE:" label.
    Note,
    /// Bullet point; nesting depth is carried by [`Block::level`].
    #[serde(alias = "list")]
    ListItem,
}

impl BlockKind {
    /// Whether this kind is one of the three heading levels.
    pub fn is_heading(self) -> bool {
        matches!(self, Self::Heading | Self::Subheading | Self::Subsubheading)
    }
}

/// A single typed unit of note content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// What this block represents.
    pub kind: BlockKind,

    /// Plain display text with markup removed.
    pub text: String,

    /// List nesting depth. Only meaningful for [`BlockKind::ListItem`].
    #[serde(default, deserialize_with = "lenient_level")]
    pub level: u32,
}

impl Block {
    /// Create a block of the given kind at level 0.
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            level: 0,
        }
    }

    /// Create a list item at the given nesting level.
    pub fn list_item(text: impl Into<String>, level: u32) -> Self {
        Self {
            kind: BlockKind::ListItem,
            text: text.into(),
            level,
        }
    }

    /// Create a note callout.
    pub fn note(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Note, text)
    }

    /// Nesting level as renderers should see it: zero for anything but list items.
    pub fn list_level(&self) -> u32 {
        match self.kind {
            BlockKind::ListItem => self.level,
            _ => 0,
        }
    }

    /// Trimmed display text.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// An ordered sequence of blocks, in reading order.
///
/// Blocks with empty text never make it in; see [`NoteDocument::push`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteDocument {
    blocks: Vec<Block>,
}

impl NoteDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from blocks, dropping any with empty trimmed text.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut doc = Self::new();
        for block in blocks {
            doc.push(block);
        }
        doc
    }

    /// Append a block, trimming its text. Returns false if it was dropped as empty.
    pub fn push(&mut self, mut block: Block) -> bool {
        let trimmed = block.text.trim();
        if trimmed.is_empty() {
            return false;
        }
        if trimmed.len() != block.text.len() {
            block.text = trimmed.to_string();
        }
        if block.kind != BlockKind::ListItem {
            block.level = 0;
        }
        self.blocks.push(block);
        true
    }

    /// Blocks in reading order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Iterate over blocks in reading order.
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl<'a> IntoIterator for &'a NoteDocument {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Renderer input: either the structured document or its flattened text.
#[derive(Debug, Clone, Copy)]
pub enum NotesInput<'a> {
    /// Structured notes; full styling is available.
    Structured(&'a NoteDocument),
    /// Flattened plain text; structure is recovered heuristically or not at all.
    Flat(&'a str),
}

impl<'a> From<&'a NoteDocument> for NotesInput<'a> {
    fn from(doc: &'a NoteDocument) -> Self {
        Self::Structured(doc)
    }
}

impl<'a> From<&'a str> for NotesInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Flat(text)
    }
}

/// Deserialize a list level, falling back to 0 on anything that is not a
/// non-negative number. Fractional values are truncated and numeric strings
/// are parsed.
fn lenient_level<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct LevelVisitor;

    impl<'de> Visitor<'de> for LevelVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a list nesting level")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<u32, E> {
            Ok(u32::try_from(v).unwrap_or(0))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<u32, E> {
            Ok(u32::try_from(v).unwrap_or(0))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<u32, E> {
            if v.is_finite() && v >= 0.0 && v <= u32::MAX as f64 {
                Ok(v.trunc() as u32)
            } else {
                Ok(0)
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<u32, E> {
            Ok(v.trim().parse().unwrap_or(0))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<u32, E> {
            Ok(0)
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<u32, E> {
            Ok(0)
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<u32, E> {
            Ok(0)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> std::result::Result<u32, D2::Error> {
            d.deserialize_any(LevelVisitor)
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<u32, A::Error> {
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            Ok(0)
        }

        fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> std::result::Result<u32, A::Error> {
            while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
            Ok(0)
        }
    }

    deserializer.deserialize_any(LevelVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_drops_empty_blocks() {
        let mut doc = NoteDocument::new();
        assert!(!doc.push(Block::new(BlockKind::Paragraph, "   ")));
        assert!(doc.push(Block::new(BlockKind::Paragraph, "  Text  ")));
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].text, "Text");
    }

    #[test]
    fn test_level_reset_for_non_list_blocks() {
        let mut block = Block::new(BlockKind::Heading, "Title");
        block.level = 3;
        let doc = NoteDocument::from_blocks([block]);
        assert_eq!(doc.blocks()[0].level, 0);
        assert_eq!(doc.blocks()[0].list_level(), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let doc = NoteDocument::from_blocks([Block::list_item("Item", 1)]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "kind": "list_item", "text": "Item", "level": 1 }])
        );
    }

    #[test]
    fn test_lenient_level_deserialization() {
        let json = r#"[
            {"kind": "list_item", "text": "a", "level": -1},
            {"kind": "list_item", "text": "b", "level": "x"},
            {"kind": "list_item", "text": "c", "level": null},
            {"kind": "list_item", "text": "d"},
            {"kind": "list_item", "text": "e", "level": 2.7},
            {"kind": "list", "text": "f", "level": "3"}
        ]"#;
        let doc: NoteDocument = serde_json::from_str(json).unwrap();
        let levels: Vec<u32> = doc.iter().map(|b| b.level).collect();
        assert_eq!(levels, vec![0, 0, 0, 0, 2, 3]);
        assert!(doc.iter().all(|b| b.kind == BlockKind::ListItem));
    }
}
