//! Error types for the notes service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Render error: {0}")]
    Render(#[from] notes_core::Error),

    #[error("Session data error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
