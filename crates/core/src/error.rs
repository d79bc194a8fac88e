//! Error types for note extraction and document export.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or reading exported documents.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write underlying bytes.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A style attribute (color, level) could not be interpreted.
    #[error("Invalid style value: {0}")]
    StyleError(String),

    /// Failed to lay out or serialize a PDF document.
    #[error("PDF error: {0}")]
    PdfError(String),

    /// ZIP archive error (for DOCX/PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML error (for DOCX/PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}
