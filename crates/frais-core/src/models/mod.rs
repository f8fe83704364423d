//! Data models for the expense pipeline.

pub mod config;
pub mod record;

pub use config::FraisConfig;
pub use record::{Category, PageRecord, PageStatus, RejectionReason};
