//! Core library for expense document reconciliation.
//!
//! This crate provides:
//! - Per-page PDF text extraction (lopdf, pdf-extract)
//! - Labeled amount matching and keyword category classification
//! - Exact-duplicate page detection by content fingerprint
//! - Report building with CSV and JSON export

pub mod error;
pub mod expense;
pub mod models;
pub mod pdf;
pub mod report;

pub use error::{FraisError, PdfError, Result};
pub use expense::rules::{AmountMatcher, DocumentClassifier, DuplicateDetector, FieldExtractor};
pub use expense::{ExpensePipeline, ExtractionResult};
pub use models::config::FraisConfig;
pub use models::record::{Category, PageRecord, PageStatus, RejectionReason};
pub use pdf::{PdfExtractor, PdfProcessor, PdfType};
pub use report::{AmountReviewGroup, Report, ReportBuilder, ReportRow};
