//! Per-page PDF text extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{non_empty_text, PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor backed by lopdf.
///
/// The parsed document lives as long as the extractor; dropping the
/// extractor releases it.
pub struct PdfExtractor {
    document: Option<Document>,
    /// Page texts from pdf-extract, when its page split agrees with the page tree.
    page_texts: Option<Vec<String>>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            page_texts: None,
        }
    }

    /// Create an extractor and load `data` into it.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    /// Run pdf-extract over the whole document, one string per page.
    ///
    /// pdf-extract panics on some malformed inputs; panics become errors.
    fn extract_pages_with_pdf_extract(data: &[u8]) -> Result<Vec<String>> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }));
        match result {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => Err(PdfError::TextExtraction(
                "pdf-extract panicked on malformed content".to_string(),
            )),
        }
    }

    /// Extract one page with lopdf's own text extraction.
    fn extract_page_with_lopdf(doc: &Document, page: u32) -> Result<String> {
        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let raw_data = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted_data
        } else {
            data.to_vec()
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        self.page_texts = match Self::extract_pages_with_pdf_extract(&raw_data) {
            Ok(pages) if pages.len() == page_count => Some(pages),
            Ok(pages) => {
                warn!(
                    "pdf-extract returned {} pages for a {} page document, using lopdf per page",
                    pages.len(),
                    page_count
                );
                None
            }
            Err(e) => {
                warn!("pdf-extract failed ({}), using lopdf per page", e);
                None
            }
        };

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_text(&self, page: u32) -> Result<Option<String>> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))?;

        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        if let Some(texts) = &self.page_texts {
            let text = texts.get((page - 1) as usize).map(String::as_str).unwrap_or("");
            trace!("pdf-extract page {}: {} chars", page, text.len());
            return Ok(non_empty_text(text));
        }

        match Self::extract_page_with_lopdf(doc, page) {
            Ok(text) => Ok(non_empty_text(&text)),
            Err(e) => {
                // An unextractable page is reviewed like an image page.
                warn!("Text extraction failed on page {}: {}", page, e);
                Ok(None)
            }
        }
    }
}
