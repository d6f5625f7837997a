//! Reversing posted journal entries.
//!
//! A reversal never edits the original: it appends a mirror entry with every
//! debit and credit swapped, and marks the original with the mirror's id.

use chrono::{DateTime, NaiveDate, Utc};
use tally_shared::types::{FiscalPeriodId, FiscalYearId, JournalEntryId};

use super::error::LedgerError;
use super::journal::{JournalEntry, JournalStatus, NewJournalEntry};

/// Prefix applied to the description and memos of a mirror entry.
pub const REVERSAL_PREFIX: &str = "Reversal: ";

impl JournalEntry {
    /// Returns the id of the entry that reversed this one, if any.
    #[must_use]
    pub fn reversal_entry_id(&self) -> Option<JournalEntryId> {
        self.reversal_entry_id
    }

    /// Returns true once a reversal has been recorded against this entry.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversal_entry_id.is_some()
    }

    /// Builds the draft mirror of this posted entry.
    ///
    /// # Errors
    ///
    /// - `NotPosted` if this entry is still a draft
    /// - `AlreadyReversed` if a reversal was already recorded
    /// - `ReversalReasonRequired` if `reason` is blank
    pub fn create_reversal(
        &self,
        reversal_date: NaiveDate,
        reason: &str,
        fiscal_year_id: FiscalYearId,
        fiscal_period_id: FiscalPeriodId,
        created_at: DateTime<Utc>,
    ) -> Result<JournalEntry, LedgerError> {
        if self.status != JournalStatus::Posted {
            return Err(LedgerError::NotPosted);
        }
        if let Some(reversal_id) = self.reversal_entry_id {
            return Err(LedgerError::AlreadyReversed { reversal_id });
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::ReversalReasonRequired);
        }

        let mut mirror = JournalEntry::create_draft(NewJournalEntry {
            journal_date: reversal_date,
            description: format!("{REVERSAL_PREFIX}{}", self.description),
            source_type: self.source_type,
            fiscal_year_id,
            fiscal_period_id,
            reference_number: self.reference_number.clone(),
            source_id: self.source_id,
        })?;
        mirror.reversed_entry_id = Some(self.id);
        mirror.reversal_reason = Some(reason.to_string());

        for line in &self.lines {
            let memo = format!("{REVERSAL_PREFIX}{}", line.memo.as_deref().unwrap_or_default());
            mirror.add_line(line.account_id, line.credit, line.debit, created_at, Some(memo))?;
        }

        Ok(mirror)
    }

    /// Records that `reversal_id` reversed this entry.
    ///
    /// The marker is advisory: the status stays `Posted`.
    pub fn mark_as_reversed(&mut self, reversal_id: JournalEntryId) -> Result<(), LedgerError> {
        if self.status != JournalStatus::Posted {
            return Err(LedgerError::NotPosted);
        }
        if let Some(existing) = self.reversal_entry_id {
            return Err(LedgerError::AlreadyReversed {
                reversal_id: existing,
            });
        }
        self.reversal_entry_id = Some(reversal_id);
        Ok(())
    }
}
