//! Rule-based extractors for expense pages.

pub mod amounts;
pub mod categories;
pub mod fingerprint;
pub mod patterns;

pub use amounts::{format_amount, parse_amount, AmountMatch, AmountMatcher};
pub use categories::{default_rules, CategoryRule, DocumentClassifier};
pub use fingerprint::{DuplicateDetector, Fingerprint};
pub use patterns::{build_amount_pattern, DEFAULT_AMOUNT_LABELS};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
