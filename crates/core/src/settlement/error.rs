//! Settlement error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::InvoiceId;
use thiserror::Error;

use super::invoice::{InvoiceKind, InvoiceStatus};

/// Errors raised while applying or reversing invoice payments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// Invoice lookup failed.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Payment amount is zero or negative.
    #[error("Payment amount must be greater than zero")]
    AmountNotPositive,

    /// Payments can only be applied to posted invoices.
    #[error("Invoice {number} is {status}; payments apply to posted invoices only")]
    InvoiceNotPosted {
        /// Invoice number.
        number: String,
        /// Current status.
        status: InvoiceStatus,
    },

    /// Payment would overpay the invoice.
    #[error("Amount {amount} exceeds the balance due {balance_due} on invoice {number}")]
    ExceedsBalanceDue {
        /// Invoice number.
        number: String,
        /// Requested amount.
        amount: Decimal,
        /// Remaining balance.
        balance_due: Decimal,
    },

    /// Reversal would take the paid amount below zero.
    #[error("Reversal {amount} exceeds the paid amount {paid} on invoice {number}")]
    ExceedsPaidAmount {
        /// Invoice number.
        number: String,
        /// Requested reversal.
        amount: Decimal,
        /// Currently paid.
        paid: Decimal,
    },

    /// Payments on cancelled invoices cannot be reversed.
    #[error("Invoice {0} is cancelled")]
    InvoiceCancelled(String),

    /// Invoice has payments and cannot be cancelled.
    #[error("Invoice {0} has payments; reverse them before cancelling")]
    HasPayments(String),

    /// Voucher linked to the wrong kind of invoice.
    #[error("Expected a {expected} invoice, got a {actual} invoice")]
    WrongInvoiceKind {
        /// Required kind.
        expected: InvoiceKind,
        /// Kind found.
        actual: InvoiceKind,
    },
}

impl SettlementError {
    /// Returns the error code for logs and API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::AmountNotPositive => "AMOUNT_NOT_POSITIVE",
            Self::InvoiceNotPosted { .. } => "INVOICE_NOT_POSTED",
            Self::ExceedsBalanceDue { .. } => "EXCEEDS_BALANCE_DUE",
            Self::ExceedsPaidAmount { .. } => "EXCEEDS_PAID_AMOUNT",
            Self::InvoiceCancelled(_) => "INVOICE_CANCELLED",
            Self::HasPayments(_) => "INVOICE_HAS_PAYMENTS",
            Self::WrongInvoiceKind { .. } => "WRONG_INVOICE_KIND",
        }
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        let message = err.to_string();
        match err {
            SettlementError::InvoiceNotFound(_) => Self::NotFound(message),
            SettlementError::AmountNotPositive | SettlementError::WrongInvoiceKind { .. } => {
                Self::Validation(message)
            }
            SettlementError::InvoiceNotPosted { .. }
            | SettlementError::InvoiceCancelled(_)
            | SettlementError::HasPayments(_) => Self::StateConflict(message),
            SettlementError::ExceedsBalanceDue { .. } | SettlementError::ExceedsPaidAmount { .. } => {
                Self::InvariantViolation(message)
            }
        }
    }
}
