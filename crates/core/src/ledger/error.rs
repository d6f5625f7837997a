//! Ledger error types for journal construction, posting and reversal.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::{AccountId, JournalEntryId};
use thiserror::Error;

use super::journal::JournalStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Journal description is blank.
    #[error("Journal entry description is required")]
    DescriptionRequired,

    /// Entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// Entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Line amount is negative.
    #[error("Line {line}: negative amounts are not allowed")]
    NegativeAmount {
        /// Line number.
        line: u32,
    },

    /// Line carries both a debit and a credit.
    #[error("Line {line}: a line is either a debit or a credit, not both")]
    BothSides {
        /// Line number.
        line: u32,
    },

    /// Line has zero on both sides.
    #[error("Line {line}: debit and credit cannot both be zero")]
    ZeroLine {
        /// Line number.
        line: u32,
    },

    /// Line amount has more than four decimal places.
    #[error("Line {line}: amounts cannot exceed 4 decimal places")]
    ExcessiveScale {
        /// Line number.
        line: u32,
    },

    /// Line lookup by number failed.
    #[error("Journal line {0} not found")]
    LineNotFound(u32),

    /// Journal number missing at post time.
    #[error("Journal number is required to post")]
    JournalNumberRequired,

    /// Posting user missing at post time.
    #[error("Posting user is required to post")]
    PostedByRequired,

    /// Reversal reason missing.
    #[error("Reversal reason is required")]
    ReversalReasonRequired,

    // ========== Account Errors ==========
    /// Account does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Account is inactive, non-leaf or closed to direct posting.
    #[error("Account {code} cannot receive postings")]
    AccountNotPostable {
        /// The account ID.
        account_id: AccountId,
        /// The account code.
        code: String,
    },

    // ========== State Errors ==========
    /// Only draft entries can be modified or posted.
    #[error("Journal entry is {status}; only drafts can be modified or posted")]
    NotDraft {
        /// Current status.
        status: JournalStatus,
    },

    /// Only posted entries can be reversed.
    #[error("Only posted journal entries can be reversed")]
    NotPosted,

    /// Entry already carries a reversal marker.
    #[error("Journal entry has already been reversed by {reversal_id}")]
    AlreadyReversed {
        /// The existing reversal entry.
        reversal_id: JournalEntryId,
    },

    /// Journal entry lookup failed.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),
}

impl LedgerError {
    /// Returns the error code for logs and API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DescriptionRequired => "DESCRIPTION_REQUIRED",
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::BothSides { .. } => "BOTH_SIDES",
            Self::ZeroLine { .. } => "ZERO_LINE",
            Self::ExcessiveScale { .. } => "EXCESSIVE_SCALE",
            Self::LineNotFound(_) => "LINE_NOT_FOUND",
            Self::JournalNumberRequired => "JOURNAL_NUMBER_REQUIRED",
            Self::PostedByRequired => "POSTED_BY_REQUIRED",
            Self::ReversalReasonRequired => "REVERSAL_REASON_REQUIRED",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountNotPostable { .. } => "ACCOUNT_NOT_POSTABLE",
            Self::NotDraft { .. } => "NOT_DRAFT",
            Self::NotPosted => "NOT_POSTED",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
            Self::EntryNotFound(_) => "JOURNAL_ENTRY_NOT_FOUND",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::DescriptionRequired
            | LedgerError::JournalNumberRequired
            | LedgerError::PostedByRequired
            | LedgerError::ReversalReasonRequired
            | LedgerError::ExcessiveScale { .. } => Self::Validation(message),

            LedgerError::AccountNotFound(_)
            | LedgerError::EntryNotFound(_)
            | LedgerError::LineNotFound(_) => Self::NotFound(message),

            LedgerError::NotDraft { .. }
            | LedgerError::NotPosted
            | LedgerError::AlreadyReversed { .. } => Self::StateConflict(message),

            LedgerError::InsufficientLines
            | LedgerError::UnbalancedEntry { .. }
            | LedgerError::NegativeAmount { .. }
            | LedgerError::BothSides { .. }
            | LedgerError::ZeroLine { .. }
            | LedgerError::AccountNotPostable { .. } => Self::InvariantViolation(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InsufficientLines.error_code(), "INSUFFICIENT_LINES");
        assert_eq!(
            LedgerError::UnbalancedEntry {
                debit: Decimal::new(100, 2),
                credit: Decimal::new(50, 2),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::AlreadyReversed {
                reversal_id: JournalEntryId::new()
            }
            .error_code(),
            "ALREADY_REVERSED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedEntry {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(5000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is not balanced. Debit: 100.00, Credit: 50.00"
        );
        assert_eq!(
            LedgerError::NotDraft {
                status: JournalStatus::Posted
            }
            .to_string(),
            "Journal entry is posted; only drafts can be modified or posted"
        );
    }

    #[test]
    fn test_app_error_kinds() {
        assert!(matches!(
            AppError::from(LedgerError::UnbalancedEntry {
                debit: Decimal::ONE,
                credit: Decimal::ZERO,
            }),
            AppError::InvariantViolation(_)
        ));
        assert!(matches!(
            AppError::from(LedgerError::AlreadyReversed {
                reversal_id: JournalEntryId::new()
            }),
            AppError::StateConflict(_)
        ));
        assert!(matches!(
            AppError::from(LedgerError::DescriptionRequired),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(LedgerError::EntryNotFound(JournalEntryId::new())),
            AppError::NotFound(_)
        ));
    }
}
