//! Human-readable document and journal numbers.
//!
//! Document numbers look like `CP-202603-0001`: a per-type prefix, the
//! year and month of the document date, and a sequence that restarts each
//! month. Journal numbers look like `JV-000001` and run per fiscal year.
//! Allocation (reading and bumping the counter) belongs to the store; this
//! module only decides keys and formatting.

use chrono::{Datelike, NaiveDate};
use tally_shared::config::NumberingConfig;

use crate::document::DocumentKind;

/// Sequence bucket for document numbers: `YYYYMM`.
#[must_use]
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}{:02}", date.year(), date.month())
}

/// Configured prefix for a document type.
#[must_use]
pub fn prefix_for<'a>(kind: DocumentKind, config: &'a NumberingConfig) -> &'a str {
    match kind {
        DocumentKind::CashPayment => &config.cash_payment,
        DocumentKind::CashReceipt => &config.cash_receipt,
        DocumentKind::CashTransfer => &config.cash_transfer,
        DocumentKind::InventoryAdjustment => &config.inventory_adjustment,
    }
}

/// Formats `{prefix}-{YYYYMM}-{seq:04}`.
#[must_use]
pub fn format_document_number(prefix: &str, date: NaiveDate, sequence: u64) -> String {
    format!("{prefix}-{}-{sequence:04}", month_key(date))
}

/// Formats `{prefix}-{seq}` with the sequence zero-padded to `width`.
#[must_use]
pub fn format_journal_number(prefix: &str, width: usize, sequence: u64) -> String {
    format!("{prefix}-{sequence:0width$}")
}
