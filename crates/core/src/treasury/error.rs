//! Treasury error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::CashboxId;
use thiserror::Error;

use crate::document::DocumentError;
use crate::settlement::SettlementError;

/// Errors raised by cashboxes and cash vouchers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreasuryError {
    /// Voucher amount is zero or negative.
    #[error("Amount must be greater than zero")]
    AmountNotPositive,

    /// Voucher description is blank.
    #[error("Description is required")]
    DescriptionRequired,

    /// Transfer source and target are the same cashbox.
    #[error("Source and target cashbox must be different")]
    SameCashbox,

    /// Cashbox lookup failed.
    #[error("Cashbox not found: {0}")]
    CashboxNotFound(CashboxId),

    /// Cashbox has no general-ledger account to post against.
    #[error("Cashbox {code} is not linked to a ledger account")]
    CashboxWithoutAccount {
        /// Cashbox code.
        code: String,
    },

    /// Cashbox was deactivated.
    #[error("Cashbox {code} is inactive")]
    CashboxInactive {
        /// Cashbox code.
        code: String,
    },

    /// Cashbox ledger balance does not cover the amount.
    #[error("Insufficient balance in cashbox {code}. Available: {available}, required: {required}")]
    InsufficientCashboxBalance {
        /// Cashbox code.
        code: String,
        /// Current ledger balance.
        available: Decimal,
        /// Amount requested.
        required: Decimal,
    },

    /// Lifecycle violation.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Linked invoice rejected the payment.
    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

impl TreasuryError {
    /// Returns the error code for logs and API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AmountNotPositive => "AMOUNT_NOT_POSITIVE",
            Self::DescriptionRequired => "DESCRIPTION_REQUIRED",
            Self::SameCashbox => "SAME_CASHBOX",
            Self::CashboxNotFound(_) => "CASHBOX_NOT_FOUND",
            Self::CashboxWithoutAccount { .. } => "CASHBOX_WITHOUT_ACCOUNT",
            Self::CashboxInactive { .. } => "CASHBOX_INACTIVE",
            Self::InsufficientCashboxBalance { .. } => "INSUFFICIENT_CASHBOX_BALANCE",
            Self::Document(inner) => inner.error_code(),
            Self::Settlement(inner) => inner.error_code(),
        }
    }
}

impl From<TreasuryError> for AppError {
    fn from(err: TreasuryError) -> Self {
        match err {
            TreasuryError::Document(inner) => inner.into(),
            TreasuryError::Settlement(inner) => inner.into(),
            TreasuryError::AmountNotPositive
            | TreasuryError::DescriptionRequired
            | TreasuryError::SameCashbox => Self::Validation(err.to_string()),
            TreasuryError::CashboxNotFound(_) => Self::NotFound(err.to_string()),
            TreasuryError::CashboxInactive { .. } => Self::StateConflict(err.to_string()),
            TreasuryError::CashboxWithoutAccount { .. }
            | TreasuryError::InsufficientCashboxBalance { .. } => {
                Self::InvariantViolation(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_balance_message() {
        let err = TreasuryError::InsufficientCashboxBalance {
            code: "MAIN".to_string(),
            available: dec!(300.00),
            required: dec!(500.00),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance in cashbox MAIN. Available: 300.00, required: 500.00"
        );
        assert!(matches!(AppError::from(err), AppError::InvariantViolation(_)));
    }

    #[test]
    fn test_wrapped_errors_keep_their_kind() {
        let err = TreasuryError::from(SettlementError::AmountNotPositive);
        assert_eq!(err.error_code(), "AMOUNT_NOT_POSITIVE");
        assert!(matches!(AppError::from(err), AppError::Validation(_)));
    }
}
