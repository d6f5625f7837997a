//! Journal entry aggregate.
//!
//! Lifecycle: Draft --post--> Posted. A posted entry is immutable; it is
//! corrected only by appending a reversal (see [`super::reversal`]).

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, FiscalPeriodId, FiscalYearId, JournalEntryId};
use uuid::Uuid;

use super::error::LedgerError;

/// Prefix of the temporary code a draft carries before it is numbered.
pub const DRAFT_CODE_PREFIX: &str = "DRAFT-";

/// Maximum decimal places accepted on a line amount.
pub const MAX_LINE_SCALE: u32 = 4;

/// Journal entry status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Entry is being built and can be modified.
    Draft,
    /// Entry is part of the permanent ledger (immutable).
    Posted,
}

impl JournalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
        }
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business document that originated a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Entered by hand.
    Manual,
    /// Opening balances.
    Opening,
    /// Cash payment voucher.
    CashPayment,
    /// Cash receipt voucher.
    CashReceipt,
    /// Cashbox-to-cashbox transfer.
    CashTransfer,
    /// Inventory adjustment.
    Adjustment,
}

impl SourceType {
    /// Returns the string representation of the source type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Opening => "opening",
            Self::CashPayment => "cash_payment",
            Self::CashReceipt => "cash_receipt",
            Self::CashTransfer => "cash_transfer",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One debit or credit against a ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// 1-based position within the entry.
    pub line_number: u32,
    /// Account being debited or credited.
    pub account_id: AccountId,
    /// Debit amount (0 if credit).
    pub debit: Decimal,
    /// Credit amount (0 if debit).
    pub credit: Decimal,
    /// Optional memo.
    pub memo: Option<String>,
    /// When the line was added.
    pub created_at: DateTime<Utc>,
}

impl JournalLine {
    /// Checks the per-line rules: non-negative, one side only, not all zero.
    pub fn check(&self) -> Result<(), LedgerError> {
        let line = self.line_number;
        if self.debit < Decimal::ZERO || self.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { line });
        }
        if self.debit > Decimal::ZERO && self.credit > Decimal::ZERO {
            return Err(LedgerError::BothSides { line });
        }
        if self.debit.is_zero() && self.credit.is_zero() {
            return Err(LedgerError::ZeroLine { line });
        }
        if self.debit.scale() > MAX_LINE_SCALE || self.credit.scale() > MAX_LINE_SCALE {
            return Err(LedgerError::ExcessiveScale { line });
        }
        Ok(())
    }
}

/// Header fields for a new draft entry.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    /// Accounting date.
    pub journal_date: NaiveDate,
    /// Description (required).
    pub description: String,
    /// Originating document type.
    pub source_type: SourceType,
    /// Fiscal year the entry books into.
    pub fiscal_year_id: FiscalYearId,
    /// Fiscal period the entry books into.
    pub fiscal_period_id: FiscalPeriodId,
    /// Human-readable reference (usually the source document number).
    pub reference_number: Option<String>,
    /// Id of the originating document.
    pub source_id: Option<Uuid>,
}

/// A double-entry journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Temporary code assigned at creation (`DRAFT-XXXXXXXX`).
    pub draft_code: String,
    /// Final number assigned at post time.
    pub journal_number: Option<String>,
    /// Accounting date.
    pub journal_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Human-readable reference.
    pub reference_number: Option<String>,
    /// Originating document type.
    pub source_type: SourceType,
    /// Id of the originating document.
    pub source_id: Option<Uuid>,
    /// Fiscal year.
    pub fiscal_year_id: FiscalYearId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// User who posted the entry.
    pub posted_by: Option<String>,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// On a reversal entry: the entry it mirrors.
    pub reversed_entry_id: Option<JournalEntryId>,
    /// On a reversal entry: why it was reversed.
    pub reversal_reason: Option<String>,
    pub(crate) status: JournalStatus,
    pub(crate) reversal_entry_id: Option<JournalEntryId>,
    pub(crate) lines: Vec<JournalLine>,
}

/// Every stored field of a journal entry, used to rebuild it from storage.
#[derive(Debug, Clone)]
pub struct JournalEntryRecord {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Temporary draft code.
    pub draft_code: String,
    /// Final number, once posted.
    pub journal_number: Option<String>,
    /// Accounting date.
    pub journal_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Human-readable reference.
    pub reference_number: Option<String>,
    /// Originating document type.
    pub source_type: SourceType,
    /// Id of the originating document.
    pub source_id: Option<Uuid>,
    /// Fiscal year.
    pub fiscal_year_id: FiscalYearId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Lifecycle status.
    pub status: JournalStatus,
    /// User who posted the entry.
    pub posted_by: Option<String>,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Entry this one mirrors.
    pub reversed_entry_id: Option<JournalEntryId>,
    /// Entry that mirrors this one.
    pub reversal_entry_id: Option<JournalEntryId>,
    /// Reversal reason.
    pub reversal_reason: Option<String>,
    /// Lines ordered by line number.
    pub lines: Vec<JournalLine>,
}

impl From<JournalEntryRecord> for JournalEntry {
    fn from(record: JournalEntryRecord) -> Self {
        Self {
            id: record.id,
            draft_code: record.draft_code,
            journal_number: record.journal_number,
            journal_date: record.journal_date,
            description: record.description,
            reference_number: record.reference_number,
            source_type: record.source_type,
            source_id: record.source_id,
            fiscal_year_id: record.fiscal_year_id,
            fiscal_period_id: record.fiscal_period_id,
            posted_by: record.posted_by,
            posted_at: record.posted_at,
            reversed_entry_id: record.reversed_entry_id,
            reversal_reason: record.reversal_reason,
            status: record.status,
            reversal_entry_id: record.reversal_entry_id,
            lines: record.lines,
        }
    }
}

impl JournalEntry {
    /// Creates an empty draft entry.
    pub fn create_draft(input: NewJournalEntry) -> Result<Self, LedgerError> {
        let description = input.description.trim();
        if description.is_empty() {
            return Err(LedgerError::DescriptionRequired);
        }

        let id = JournalEntryId::new();
        let simple = id.into_inner().simple().to_string();
        let suffix = &simple[simple.len() - 8..];

        Ok(Self {
            id,
            draft_code: format!("{DRAFT_CODE_PREFIX}{}", suffix.to_uppercase()),
            journal_number: None,
            journal_date: input.journal_date,
            description: description.to_string(),
            reference_number: input
                .reference_number
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            source_type: input.source_type,
            source_id: input.source_id,
            fiscal_year_id: input.fiscal_year_id,
            fiscal_period_id: input.fiscal_period_id,
            posted_by: None,
            posted_at: None,
            reversed_entry_id: None,
            reversal_reason: None,
            status: JournalStatus::Draft,
            reversal_entry_id: None,
            lines: Vec::new(),
        })
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> JournalStatus {
        self.status
    }

    /// Lines in posting order.
    #[must_use]
    pub fn lines(&self) -> &[JournalLine] {
        &self.lines
    }

    /// Returns true once the entry is part of the permanent ledger.
    #[must_use]
    pub fn is_posted(&self) -> bool {
        self.status == JournalStatus::Posted
    }

    /// Sum of all debits.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sum of all credits.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit() == self.total_credit()
    }

    /// Appends a line. Drafts only.
    pub fn add_line(
        &mut self,
        account_id: AccountId,
        debit: Decimal,
        credit: Decimal,
        created_at: DateTime<Utc>,
        memo: Option<String>,
    ) -> Result<u32, LedgerError> {
        self.ensure_draft()?;

        let line_number = u32::try_from(self.lines.len() + 1).unwrap_or(u32::MAX);
        let line = JournalLine {
            line_number,
            account_id,
            debit,
            credit,
            memo: memo.filter(|m| !m.trim().is_empty()),
            created_at,
        };
        line.check()?;
        self.lines.push(line);
        Ok(line_number)
    }

    /// Removes a line and renumbers the rest. Drafts only.
    pub fn remove_line(&mut self, line_number: u32) -> Result<(), LedgerError> {
        self.ensure_draft()?;

        let index = self
            .lines
            .iter()
            .position(|l| l.line_number == line_number)
            .ok_or(LedgerError::LineNotFound(line_number))?;
        self.lines.remove(index);

        for (i, line) in self.lines.iter_mut().enumerate() {
            line.line_number = u32::try_from(i + 1).unwrap_or(u32::MAX);
        }
        Ok(())
    }

    /// Replaces the amounts on one line. Drafts only.
    pub fn update_line_amount(
        &mut self,
        line_number: u32,
        debit: Decimal,
        credit: Decimal,
    ) -> Result<(), LedgerError> {
        self.ensure_draft()?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_number == line_number)
            .ok_or(LedgerError::LineNotFound(line_number))?;

        let candidate = JournalLine {
            debit,
            credit,
            ..line.clone()
        };
        candidate.check()?;
        *line = candidate;
        Ok(())
    }

    /// Changes the header text. Drafts only.
    pub fn update_draft(
        &mut self,
        description: &str,
        reference_number: Option<&str>,
    ) -> Result<(), LedgerError> {
        self.ensure_draft()?;

        let description = description.trim();
        if description.is_empty() {
            return Err(LedgerError::DescriptionRequired);
        }
        self.description = description.to_string();
        self.reference_number = reference_number
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(ToString::to_string);
        Ok(())
    }

    /// Lists every rule the entry currently breaks. Never mutates.
    #[must_use]
    pub fn validate(&self) -> Vec<LedgerError> {
        let mut errors = Vec::new();

        if self.description.trim().is_empty() {
            errors.push(LedgerError::DescriptionRequired);
        }
        if self.lines.len() < 2 {
            errors.push(LedgerError::InsufficientLines);
        }

        let debit = self.total_debit();
        let credit = self.total_credit();
        if debit != credit {
            errors.push(LedgerError::UnbalancedEntry { debit, credit });
        }

        errors.extend(self.lines.iter().filter_map(|l| l.check().err()));
        errors
    }

    /// Assigns the final number and moves the entry into the ledger.
    ///
    /// Fails with the first violated rule; on failure the entry stays Draft.
    pub fn post(
        &mut self,
        journal_number: &str,
        posted_by: &str,
        posted_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        self.ensure_draft()?;

        let journal_number = journal_number.trim();
        if journal_number.is_empty() {
            return Err(LedgerError::JournalNumberRequired);
        }
        let posted_by = posted_by.trim();
        if posted_by.is_empty() {
            return Err(LedgerError::PostedByRequired);
        }

        if let Some(err) = self.validate().into_iter().next() {
            return Err(err);
        }

        self.status = JournalStatus::Posted;
        self.journal_number = Some(journal_number.to_string());
        self.posted_by = Some(posted_by.to_string());
        self.posted_at = Some(posted_at);
        Ok(())
    }

    fn ensure_draft(&self) -> Result<(), LedgerError> {
        match self.status {
            JournalStatus::Draft => Ok(()),
            status => Err(LedgerError::NotDraft { status }),
        }
    }
}
