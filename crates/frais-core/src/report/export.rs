//! Tabular export of a report (CSV and JSON).

use std::io;

use rust_decimal::Decimal;
use serde::Serialize;

use super::Report;
use crate::error::{FraisError, Result};
use crate::expense::rules::format_amount;
use crate::models::record::{Category, PageRecord, PageStatus, RejectionReason};

/// Column names of the exported table.
pub const CSV_HEADER: [&str; 6] = [
    "Page",
    "Amount",
    "Status",
    "RejectionReason",
    "Category",
    "Duplicate",
];

/// One row of the page table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub page: u32,
    /// Underlying value; the display string is never parsed back.
    pub amount: Option<Decimal>,
    /// Amount as shown to users, empty when there is none.
    pub amount_display: String,
    pub status: PageStatus,
    pub rejection_reason: Option<RejectionReason>,
    pub category: Category,
    pub duplicate: bool,
}

impl ReportRow {
    pub fn from_record(record: &PageRecord, currency_symbol: &str) -> Self {
        Self {
            page: record.page_number,
            amount: record.amount,
            amount_display: record
                .amount
                .map(|a| format_amount(a, currency_symbol))
                .unwrap_or_default(),
            status: record.status,
            rejection_reason: record.rejection_reason,
            category: record.category,
            duplicate: record.is_duplicate,
        }
    }

    fn csv_fields(&self) -> [String; 6] {
        [
            self.page.to_string(),
            self.amount_display.clone(),
            self.status.to_string(),
            self.rejection_reason
                .map(|r| r.to_string())
                .unwrap_or_default(),
            self.category.to_string(),
            if self.duplicate { "Yes" } else { "No" }.to_string(),
        ]
    }
}

impl Report {
    /// Write the page table as CSV, header first.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(CSV_HEADER)?;
        for row in &self.rows {
            wtr.write_record(row.csv_fields())?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// The page table as a CSV string.
    pub fn to_csv(&self) -> Result<String> {
        let mut data = Vec::new();
        self.write_csv(&mut data)?;
        String::from_utf8(data)
            .map_err(|e| FraisError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    /// The whole report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
