//! Per-page expense pipeline: text, duplicate check, category, amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::Result;
use crate::models::config::FraisConfig;
use crate::models::record::{Category, PageRecord};
use crate::pdf::{PdfExtractor, PdfProcessor, PdfType};

use super::rules::{AmountMatcher, DocumentClassifier, DuplicateDetector, FieldExtractor};

/// Result of running the pipeline over one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Sum of amounts over OK, non-duplicate pages.
    pub total_sum: Decimal,
    /// One record per page, in document order.
    pub page_records: Vec<PageRecord>,
    /// Text pages where no amount was found.
    pub missing_pages: Vec<u32>,
    /// Pages without extractable text.
    pub image_pages: Vec<u32>,
    /// Pages repeating the text of an earlier page.
    pub duplicate_pages: Vec<u32>,
}

impl ExtractionResult {
    /// (page, amount) for every page that produced an amount.
    pub fn page_totals(&self) -> Vec<(u32, Decimal)> {
        self.page_records
            .iter()
            .filter(|r| r.counts_towards_total())
            .filter_map(|r| r.amount.map(|a| (r.page_number, a)))
            .collect()
    }

    pub fn page_count(&self) -> usize {
        self.page_records.len()
    }

    pub fn needs_review_count(&self) -> usize {
        self.page_records
            .iter()
            .filter(|r| r.rejection_reason.is_some())
            .count()
    }

    /// True when every page contributed an amount.
    pub fn all_pages_valid(&self) -> bool {
        self.needs_review_count() == 0
    }

    /// Whether the document had text pages, image pages or both.
    pub fn document_kind(&self) -> PdfType {
        let image_pages = self.image_pages.len();
        PdfType::from_page_counts(self.page_count() - image_pages, image_pages)
    }
}

/// Running state threaded through the ordered page sequence.
#[derive(Debug, Default)]
struct PageAccumulator {
    detector: DuplicateDetector,
    records: Vec<PageRecord>,
    total: Decimal,
}

impl PageAccumulator {
    fn push(&mut self, record: PageRecord) {
        let record = match record.amount.filter(|_| record.counts_towards_total()) {
            Some(amount) => match self.total.checked_add(amount) {
                Some(total) => {
                    self.total = total;
                    record
                }
                None => {
                    warn!(
                        "Page {}: amount {} overflows the running total, sent to review",
                        record.page_number, amount
                    );
                    let PageRecord {
                        page_number,
                        raw_text,
                        category,
                        ..
                    } = record;
                    PageRecord::unmatched(page_number, raw_text.unwrap_or_default(), category)
                }
            },
            None => record,
        };
        self.records.push(record);
    }

    fn finish(self) -> ExtractionResult {
        let pages_where = |pred: fn(&PageRecord) -> bool| -> Vec<u32> {
            self.records
                .iter()
                .filter(|&r| pred(r))
                .map(|r| r.page_number)
                .collect()
        };

        let missing_pages = pages_where(PageRecord::is_missing_amount);
        let image_pages = pages_where(PageRecord::is_image);
        let duplicate_pages = pages_where(|r| r.is_duplicate);

        ExtractionResult {
            total_sum: self.total,
            page_records: self.records,
            missing_pages,
            image_pages,
            duplicate_pages,
        }
    }
}

/// Expense extraction pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExpensePipeline {
    matcher: AmountMatcher,
    classifier: DocumentClassifier,
}

impl ExpensePipeline {
    /// Create a pipeline with the built-in labels and category rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline from configuration.
    pub fn from_config(config: &FraisConfig) -> Result<Self> {
        config.validate()?;
        let matcher = AmountMatcher::with_labels(&config.extraction.labels)?;
        let classifier =
            DocumentClassifier::new().with_extra_keywords(&config.classification.extra_keywords);
        Ok(Self {
            matcher,
            classifier,
        })
    }

    /// Set the amount matcher.
    pub fn with_matcher(mut self, matcher: AmountMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Set the document classifier.
    pub fn with_classifier(mut self, classifier: DocumentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run the pipeline over a PDF byte stream.
    ///
    /// Fails only when the document cannot be opened; page-level problems
    /// become review records.
    pub fn process_pdf(&self, data: &[u8]) -> Result<ExtractionResult> {
        let extractor = PdfExtractor::from_bytes(data)?;
        Ok(self.process_document(&extractor))
    }

    /// Run the pipeline over every page of a loaded document.
    pub fn process_document<P: PdfProcessor + ?Sized>(&self, source: &P) -> ExtractionResult {
        let page_count = source.page_count();
        debug!("Processing document with {} pages", page_count);

        let pages = (1..=page_count).map(|page| {
            source.extract_page_text(page).unwrap_or_else(|e| {
                warn!("Could not read page {}: {}", page, e);
                None
            })
        });

        self.process_pages(pages)
    }

    /// Run the pipeline over page texts in document order (`None` = no text).
    pub fn process_pages<I>(&self, pages: I) -> ExtractionResult
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut acc = PageAccumulator::default();

        for (index, text) in pages.into_iter().enumerate() {
            let page_number = index as u32 + 1;
            let record = self.process_page(&mut acc.detector, page_number, text);
            debug!(
                "Page {}: {} {:?} category={} duplicate={}",
                page_number,
                record.status,
                record.amount,
                record.category,
                record.is_duplicate
            );
            acc.push(record);
        }

        let result = acc.finish();
        info!(
            "Extracted {} from {} pages ({} missing, {} image, {} duplicate)",
            result.total_sum,
            result.page_count(),
            result.missing_pages.len(),
            result.image_pages.len(),
            result.duplicate_pages.len()
        );
        result
    }

    fn process_page(
        &self,
        detector: &mut DuplicateDetector,
        page_number: u32,
        text: Option<String>,
    ) -> PageRecord {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return PageRecord::image(page_number);
        };

        let (fingerprint, is_duplicate) = detector.observe(&text);
        trace!("Page {} fingerprint {}", page_number, fingerprint);

        let category = self.classify(&text);
        if is_duplicate {
            return PageRecord::duplicate(page_number, text, category);
        }

        match self.matcher.extract(&text) {
            Some(found) => {
                trace!("Page {} matched {:?} -> {}", page_number, found.source, found.amount);
                PageRecord::matched(page_number, text, category, found.amount)
            }
            None => PageRecord::unmatched(page_number, text, category),
        }
    }

    fn classify(&self, text: &str) -> Category {
        let matches = self.classifier.extract_all(text);
        if matches.len() > 1 {
            trace!("Several categories match, keeping the first of {:?}", matches);
        }
        matches.first().copied().unwrap_or(Category::Unknown)
    }
}
