//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use serde::{Deserialize, Serialize};

use crate::error::PdfError;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfType {
    /// Every page has extractable text.
    Text,
    /// Only image pages (scanned document).
    Image,
    /// Both text pages and image pages.
    Hybrid,
    /// No pages at all.
    Empty,
}

impl PdfType {
    /// Classify a document from the number of text and image pages.
    pub fn from_page_counts(text_pages: usize, image_pages: usize) -> Self {
        match (text_pages > 0, image_pages > 0) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        }
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Source of per-page text for the expense pipeline.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    ///
    /// Returns `Ok(None)` when the page carries no extractable text.
    fn extract_page_text(&self, page: u32) -> Result<Option<String>>;
}

/// Normalize extracted page text, mapping whitespace-only output to `None`.
pub(crate) fn non_empty_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_type_from_counts() {
        assert_eq!(PdfType::from_page_counts(3, 0), PdfType::Text);
        assert_eq!(PdfType::from_page_counts(0, 2), PdfType::Image);
        assert_eq!(PdfType::from_page_counts(2, 1), PdfType::Hybrid);
        assert_eq!(PdfType::from_page_counts(0, 0), PdfType::Empty);
    }

    #[test]
    fn test_non_empty_text() {
        assert_eq!(non_empty_text("  \n\t "), None);
        assert_eq!(non_empty_text("\nPrix 10.00\n"), Some("Prix 10.00".to_string()));
    }
}
