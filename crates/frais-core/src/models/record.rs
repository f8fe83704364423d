//! Per-page records produced by the expense pipeline.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Expense category assigned to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Taxi,
    Train,
    Plane,
    PublicTransport,
    Boat,
    Parking,
    Toll,
    Fuel,
    Hotel,
    /// No keyword rule matched (or the page had no text).
    Unknown,
}

impl Category {
    /// All categories, in classifier priority order.
    pub const ALL: [Category; 10] = [
        Category::Taxi,
        Category::Train,
        Category::Plane,
        Category::PublicTransport,
        Category::Boat,
        Category::Parking,
        Category::Toll,
        Category::Fuel,
        Category::Hotel,
        Category::Unknown,
    ];

    /// Human readable label used in tables and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Taxi => "Taxi",
            Category::Train => "Train",
            Category::Plane => "Plane",
            Category::PublicTransport => "Public Transport",
            Category::Boat => "Boat",
            Category::Parking => "Parking",
            Category::Toll => "Toll",
            Category::Fuel => "Fuel",
            Category::Hotel => "Hotel",
            Category::Unknown => "Unknown",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Parse a display label or snake_case name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "");
        Category::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase().replace(' ', "") == normalized)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Review status of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageStatus {
    /// An amount was extracted and counts towards the total.
    #[serde(rename = "OK")]
    Ok,
    /// A human must check this page.
    NeedsReview,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Ok => "OK",
            PageStatus::NeedsReview => "NeedsReview",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a page was sent to manual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Extraction yielded no text (scanned page, picture, blank page).
    ImageContent,
    /// Same text as an earlier page of the document.
    DuplicatePage,
    /// No label/number pair found, or the number did not parse.
    NoAmountFound,
}

impl RejectionReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::ImageContent => "Page contains an image or non-text content",
            RejectionReason::DuplicatePage => "Duplicate page",
            RejectionReason::NoAmountFound => "No amount found",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of the pipeline for a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number (1-indexed, document order).
    pub page_number: u32,

    /// Extracted text, absent for image pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,

    /// Extracted amount, only set on OK pages.
    pub amount: Option<Decimal>,

    pub status: PageStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,

    pub category: Category,

    pub is_duplicate: bool,
}

impl PageRecord {
    /// Page without extractable text.
    pub fn image(page_number: u32) -> Self {
        Self {
            page_number,
            raw_text: None,
            amount: None,
            status: PageStatus::NeedsReview,
            rejection_reason: Some(RejectionReason::ImageContent),
            category: Category::Unknown,
            is_duplicate: false,
        }
    }

    /// Page whose text repeats an earlier page.
    pub fn duplicate(page_number: u32, text: String, category: Category) -> Self {
        Self {
            page_number,
            raw_text: Some(text),
            amount: None,
            status: PageStatus::NeedsReview,
            rejection_reason: Some(RejectionReason::DuplicatePage),
            category,
            is_duplicate: true,
        }
    }

    /// Page with an extracted amount.
    pub fn matched(page_number: u32, text: String, category: Category, amount: Decimal) -> Self {
        Self {
            page_number,
            raw_text: Some(text),
            amount: Some(amount),
            status: PageStatus::Ok,
            rejection_reason: None,
            category,
            is_duplicate: false,
        }
    }

    /// Text page where no amount could be found.
    pub fn unmatched(page_number: u32, text: String, category: Category) -> Self {
        Self {
            page_number,
            raw_text: Some(text),
            amount: None,
            status: PageStatus::NeedsReview,
            rejection_reason: Some(RejectionReason::NoAmountFound),
            category,
            is_duplicate: false,
        }
    }

    /// Whether the amount of this page counts towards the document total.
    pub fn counts_towards_total(&self) -> bool {
        self.status == PageStatus::Ok && !self.is_duplicate
    }

    pub fn is_image(&self) -> bool {
        self.rejection_reason == Some(RejectionReason::ImageContent)
    }

    pub fn is_missing_amount(&self) -> bool {
        self.rejection_reason == Some(RejectionReason::NoAmountFound)
    }
}
