//! Study notes service: asks a text-generation backend for notes on a
//! topic, keeps the result per session, and renders downloads.

pub mod error;
pub mod generator;
pub mod notes;
pub mod session;

pub use error::{Result, ServiceError};
pub use generator::{build_prompt, GeminiClient, GeminiConfig, NoteGenerator};
pub use notes::{render_export, DownloadOutcome, ExportFormat, NotesService, SearchOutcome};
pub use session::{InMemorySessionStore, SessionStore};
