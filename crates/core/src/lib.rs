//! Core note model, HTML note extraction, plain-text flattening, and
//! shared OOXML packaging for study note exports.

pub mod error;
pub mod extract;
pub mod flatten;
pub mod ooxml;
pub mod style;
pub mod types;

pub use error::{Error, Result};
pub use extract::{extract, NoteExtractor};
pub use flatten::flatten;
pub use style::Rgb;
pub use types::{Block, BlockKind, NoteDocument, NotesInput};

/// Title used for the first page, document heading, or default slide.
pub fn notes_title(topic: &str) -> String {
    format!("Notes on {}", topic)
}
