//! Error types for the frais-core library.

use thiserror::Error;

/// Main error type for the frais library.
#[derive(Error, Debug)]
pub enum FraisError {
    /// The document could not be opened or parsed as a PDF.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Report export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FraisError {
    /// Whether this error means the input document itself is unusable.
    pub fn is_unreadable_document(&self) -> bool {
        matches!(self, FraisError::Pdf(_))
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Result type for the frais library.
pub type Result<T> = std::result::Result<T, FraisError>;
