//! Plain-text rendering of a note document.
//!
//! The flattened form is what gets stored as the text fallback and what the
//! Word export consumes. Structure is lossy: headings become plain lines.

use crate::types::{Block, BlockKind, NoteDocument};

/// Prefix marking a note callout in flattened text.
pub const NOTE_PREFIX: &str = "NOTE:";

/// Bullet marker for list items in flattened text.
pub const BULLET: &str = "•";

/// Render one block as a single line, or `None` if its text is empty.
pub fn flatten_block(block: &Block) -> Option<String> {
    let text = block.trimmed_text();
    if text.is_empty() {
        return None;
    }

    let line = match block.kind {
        BlockKind::Note => format!("{} {}", NOTE_PREFIX, text),
        BlockKind::ListItem => {
            let indent = "  ".repeat(block.list_level() as usize);
            format!("{}{} {}", indent, BULLET, text)
        }
        _ => text.to_string(),
    };
    Some(line)
}

/// Render a document as newline-joined lines, one per block.
pub fn flatten(doc: &NoteDocument) -> String {
    doc.iter()
        .filter_map(flatten_block)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Non-empty trimmed lines of flattened text, in order.
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Whether a flattened line is a note callout.
pub fn is_note_line(line: &str) -> bool {
    line.starts_with(NOTE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_line() {
        assert_eq!(flatten_block(&Block::note("Exam tip")).unwrap(), "NOTE: Exam tip");
    }

    #[test]
    fn test_list_item_indent() {
        assert_eq!(
            flatten_block(&Block::list_item("Item A", 2)).unwrap(),
            "    • Item A"
        );
        assert_eq!(flatten_block(&Block::list_item("Top", 0)).unwrap(), "• Top");
    }

    #[test]
    fn test_other_kinds_unchanged() {
        for kind in [
            BlockKind::Heading,
            BlockKind::Subheading,
            BlockKind::Subsubheading,
            BlockKind::Paragraph,
        ] {
            assert_eq!(flatten_block(&Block::new(kind, "Text")).unwrap(), "Text");
        }
    }

    #[test]
    fn test_empty_text_skipped() {
        assert_eq!(flatten_block(&Block::new(BlockKind::Paragraph, "  ")), None);
    }

    #[test]
    fn test_flatten_document() {
        let doc = NoteDocument::from_blocks([
            Block::new(BlockKind::Heading, "Algebra"),
            Block::new(BlockKind::Paragraph, "Intro text"),
            Block::note("remember signs"),
            Block::list_item("Term A", 0),
            Block::list_item("Sub A1", 1),
        ]);
        assert_eq!(
            flatten(&doc),
            "Algebra\nIntro text\nNOTE: remember signs\n• Term A\n  • Sub A1"
        );
    }

    #[test]
    fn test_non_empty_lines() {
        let lines: Vec<&str> = non_empty_lines("  a \n\n\t\r\nb\r\n  ").collect();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn test_flatten_empty_document() {
        assert_eq!(flatten(&NoteDocument::new()), "");
    }
}
