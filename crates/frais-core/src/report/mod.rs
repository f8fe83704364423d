//! Reconciliation report built from pipeline results.

mod export;

pub use export::{ReportRow, CSV_HEADER};

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::expense::rules::format_amount;
use crate::expense::ExtractionResult;
use crate::models::config::ReportConfig;
use crate::models::record::Category;
use crate::pdf::PdfType;

/// OK pages sharing both amount and category, worth a manual look.
///
/// Independent from the page fingerprint check: the pages may have
/// different text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountReviewGroup {
    pub category: Category,
    pub amount: Decimal,
    pub pages: Vec<u32>,
}

/// Aggregated view of one document, ready for display and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub total_sum: Decimal,
    pub total_display: String,
    pub page_totals: Vec<(u32, Decimal)>,
    pub missing_pages: Vec<u32>,
    pub image_pages: Vec<u32>,
    pub duplicate_pages: Vec<u32>,
    pub amount_review: Vec<AmountReviewGroup>,
    pub document_kind: PdfType,
    pub all_pages_valid: bool,
    pub rows: Vec<ReportRow>,
}

/// Builds [`Report`]s with a given currency rendering.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    currency_symbol: String,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::from_config(&ReportConfig::default())
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            currency_symbol: config.currency_symbol.clone(),
        }
    }

    /// Set the currency symbol used in display amounts.
    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Format an amount with this builder's currency symbol.
    pub fn display_amount(&self, amount: Decimal) -> String {
        format_amount(amount, &self.currency_symbol)
    }

    pub fn build(&self, result: &ExtractionResult) -> Report {
        let rows: Vec<ReportRow> = result
            .page_records
            .iter()
            .map(|record| ReportRow::from_record(record, &self.currency_symbol))
            .collect();

        let amount_review = duplicate_amounts(result);
        debug!(
            "Built report: {} rows, {} amount review groups",
            rows.len(),
            amount_review.len()
        );

        Report {
            total_sum: result.total_sum,
            total_display: self.display_amount(result.total_sum),
            page_totals: result.page_totals(),
            missing_pages: result.missing_pages.clone(),
            image_pages: result.image_pages.clone(),
            duplicate_pages: result.duplicate_pages.clone(),
            amount_review,
            document_kind: result.document_kind(),
            all_pages_valid: result.all_pages_valid(),
            rows,
        }
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Group OK pages by (category, amount) and keep groups of two or more.
pub fn duplicate_amounts(result: &ExtractionResult) -> Vec<AmountReviewGroup> {
    let mut groups: BTreeMap<(Category, Decimal), Vec<u32>> = BTreeMap::new();

    for record in result.page_records.iter().filter(|r| r.counts_towards_total()) {
        if let Some(amount) = record.amount {
            // normalize() so 10.0 and 10.00 land in the same group
            groups
                .entry((record.category, amount.normalize()))
                .or_default()
                .push(record.page_number);
        }
    }

    let mut review: Vec<AmountReviewGroup> = groups
        .into_iter()
        .filter(|(_, pages)| pages.len() > 1)
        .map(|((category, amount), pages)| AmountReviewGroup {
            category,
            amount,
            pages,
        })
        .collect();

    review.sort_by_key(|g| g.pages[0]);
    review
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::ExpensePipeline;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn run(texts: &[Option<&str>]) -> ExtractionResult {
        ExpensePipeline::new().process_pages(texts.iter().map(|t| t.map(str::to_string)))
    }

    #[test]
    fn test_report_lists() {
        let result = run(&[Some("Prix 10.00"), None, Some("Prix 10.00"), Some("Bonjour")]);
        let report = ReportBuilder::new().build(&result);

        assert_eq!(report.total_display, "€10.00");
        assert_eq!(report.page_totals, vec![(1, dec("10.00"))]);
        assert_eq!(report.missing_pages, vec![4]);
        assert_eq!(report.image_pages, vec![2]);
        assert_eq!(report.duplicate_pages, vec![3]);
        assert_eq!(report.document_kind, PdfType::Hybrid);
        assert!(!report.all_pages_valid);
        assert_eq!(report.rows.len(), 4);
    }

    #[test]
    fn test_amount_review_same_category() {
        let result = run(&[
            Some("Uber trip 1\nTotal 18,40"),
            Some("SNCF\nPrix 18,40"),
            Some("Uber trip 2\nTotal 18.4"),
            Some("Bolt\nTotal 9,00"),
        ]);

        let review = duplicate_amounts(&result);
        assert_eq!(
            review,
            vec![AmountReviewGroup {
                category: Category::Taxi,
                amount: dec("18.4"),
                pages: vec![1, 3],
            }]
        );
        // Different text, so the fingerprint check does not flag them.
        assert!(result.duplicate_pages.is_empty());
    }

    #[test]
    fn test_amount_review_ignores_fingerprint_duplicates() {
        let result = run(&[Some("Uber\nTotal 7,00"), Some("Uber\nTotal 7,00")]);
        assert!(duplicate_amounts(&result).is_empty());
        assert_eq!(result.duplicate_pages, vec![2]);
    }

    #[test]
    fn test_all_pages_valid() {
        let result = run(&[Some("Prix 1,00"), Some("Prix 2,00")]);
        let report = ReportBuilder::new().with_currency_symbol("CHF ").build(&result);
        assert!(report.all_pages_valid);
        assert_eq!(report.total_display, "CHF 3.00");
        assert_eq!(report.document_kind, PdfType::Text);
    }
}
