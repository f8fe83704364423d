//! Expense page extraction: amounts, categories and duplicates.

mod pipeline;
pub mod rules;

pub use pipeline::{ExpensePipeline, ExtractionResult};
