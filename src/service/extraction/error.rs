//! Error types for document text extraction

use thiserror::Error;

/// Why no text could be taken from a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}': upload a .txt, .pdf, .doc or .docx file")]
    Unsupported(String),

    #[error("The document is encrypted and its text cannot be read")]
    Encrypted,

    #[error("Successfully uploaded, but no text could be extracted from this file")]
    Empty,

    #[error("An error occurred while processing the file: {0}")]
    ReadError(String),
}
