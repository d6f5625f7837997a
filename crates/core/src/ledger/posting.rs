//! Posting plans: the journal a document will book, before it is built.
//!
//! Documents describe *what* to book as a [`PostingPlan`]; the plan becomes
//! a draft [`JournalEntry`] only once the fiscal gate has resolved a period.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tally_shared::types::AccountId;
use uuid::Uuid;

use super::error::LedgerError;
use super::journal::{JournalEntry, NewJournalEntry, SourceType};
use crate::fiscal::PostingPeriod;

/// One planned debit or credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    /// Account to book against.
    pub account_id: AccountId,
    /// Debit amount (0 if credit).
    pub debit: Decimal,
    /// Credit amount (0 if debit).
    pub credit: Decimal,
    /// Line memo.
    pub memo: String,
}

impl PlannedLine {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal, memo: impl Into<String>) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            memo: memo.into(),
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal, memo: impl Into<String>) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            memo: memo.into(),
        }
    }
}

/// A journal entry waiting for its period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingPlan {
    /// Accounting date.
    pub date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Originating document type.
    pub source_type: SourceType,
    /// Originating document number.
    pub reference_number: String,
    /// Originating document id.
    pub source_id: Uuid,
    /// Lines in booking order.
    pub lines: Vec<PlannedLine>,
}

impl PostingPlan {
    /// Returns true when there is nothing to book.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of planned debits.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sum of planned credits.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Builds the draft entry inside `period`.
    pub fn into_draft(
        self,
        period: &PostingPeriod,
        created_at: DateTime<Utc>,
    ) -> Result<JournalEntry, LedgerError> {
        let mut entry = JournalEntry::create_draft(NewJournalEntry {
            journal_date: self.date,
            description: self.description,
            source_type: self.source_type,
            fiscal_year_id: period.fiscal_year_id,
            fiscal_period_id: period.fiscal_period_id,
            reference_number: Some(self.reference_number),
            source_id: Some(self.source_id),
        })?;

        for line in self.lines {
            entry.add_line(
                line.account_id,
                line.debit,
                line.credit,
                created_at,
                Some(line.memo),
            )?;
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_shared::types::{FiscalPeriodId, FiscalYearId};

    fn period() -> PostingPeriod {
        PostingPeriod {
            fiscal_year_id: FiscalYearId::new(),
            fiscal_period_id: FiscalPeriodId::new(),
            year: 2026,
            month: 4,
        }
    }

    #[test]
    fn test_into_draft_carries_header_and_lines() {
        let cash = AccountId::new();
        let supplier = AccountId::new();
        let source_id = Uuid::now_v7();
        let plan = PostingPlan {
            date: NaiveDate::from_ymd_opt(2026, 4, 9).unwrap(),
            description: "Cash payment CP-202604-0003".to_string(),
            source_type: SourceType::CashPayment,
            reference_number: "CP-202604-0003".to_string(),
            source_id,
            lines: vec![
                PlannedLine::debit(supplier, dec!(75.50), "Supplier"),
                PlannedLine::credit(cash, dec!(75.50), "Cashbox"),
            ],
        };
        let period = period();

        let entry = plan.into_draft(&period, Utc::now()).unwrap();

        assert_eq!(entry.fiscal_period_id, period.fiscal_period_id);
        assert_eq!(entry.source_id, Some(source_id));
        assert_eq!(entry.reference_number.as_deref(), Some("CP-202604-0003"));
        assert_eq!(entry.lines().len(), 2);
        assert_eq!(entry.lines()[0].account_id, supplier);
        assert!(entry.is_balanced());
    }

    #[test]
    fn test_into_draft_rejects_bad_line() {
        let plan = PostingPlan {
            date: NaiveDate::from_ymd_opt(2026, 4, 9).unwrap(),
            description: "Broken".to_string(),
            source_type: SourceType::Manual,
            reference_number: "X".to_string(),
            source_id: Uuid::now_v7(),
            lines: vec![PlannedLine::debit(AccountId::new(), Decimal::ZERO, "zero")],
        };
        assert_eq!(
            plan.into_draft(&period(), Utc::now()).unwrap_err(),
            LedgerError::ZeroLine { line: 1 }
        );
    }
}
