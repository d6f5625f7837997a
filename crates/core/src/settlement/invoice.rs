//! Invoice balances touched by cash vouchers.
//!
//! Only the settlement side of an invoice lives here: its net total, how
//! much has been paid, and the derived balance due.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::InvoiceId;

use super::error::SettlementError;

/// Which side of the business the invoice is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    /// Issued to a customer; settled by cash receipts.
    Sales,
    /// Received from a supplier; settled by cash payments.
    Purchase,
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sales => "sales",
            Self::Purchase => "purchase",
        })
    }
}

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Not yet booked.
    Draft,
    /// Booked; can receive payments.
    Posted,
    /// Reversed.
    Cancelled,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Payment progress, recalculated after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid.
    Unpaid,
    /// Some but not all paid.
    PartiallyPaid,
    /// Fully paid.
    Paid,
}

/// An invoice as seen by settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier.
    pub id: InvoiceId,
    /// Invoice number.
    pub number: String,
    /// Sales or purchase.
    pub kind: InvoiceKind,
    /// Current status.
    pub status: InvoiceStatus,
    /// Total after discounts and taxes.
    pub net_total: Decimal,
    /// Amount settled so far.
    pub paid_amount: Decimal,
    /// Derived from `paid_amount` and `net_total`.
    pub payment_status: PaymentStatus,
}

impl Invoice {
    /// Creates a posted, unpaid invoice.
    #[must_use]
    pub fn posted(number: impl Into<String>, kind: InvoiceKind, net_total: Decimal) -> Self {
        Self {
            id: InvoiceId::new(),
            number: number.into(),
            kind,
            status: InvoiceStatus::Posted,
            net_total,
            paid_amount: Decimal::ZERO,
            payment_status: PaymentStatus::Unpaid,
        }
    }

    /// Net total minus paid amount.
    #[must_use]
    pub fn balance_due(&self) -> Decimal {
        self.net_total - self.paid_amount
    }

    /// Fails unless the invoice is the expected kind.
    pub fn ensure_kind(&self, expected: InvoiceKind) -> Result<(), SettlementError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(SettlementError::WrongInvoiceKind {
                expected,
                actual: self.kind,
            })
        }
    }

    /// Checks that `amount` could be applied, without applying it.
    pub fn check_payment(&self, amount: Decimal) -> Result<(), SettlementError> {
        if self.status != InvoiceStatus::Posted {
            return Err(SettlementError::InvoiceNotPosted {
                number: self.number.clone(),
                status: self.status,
            });
        }
        if amount <= Decimal::ZERO {
            return Err(SettlementError::AmountNotPositive);
        }
        let balance_due = self.balance_due();
        if amount > balance_due {
            return Err(SettlementError::ExceedsBalanceDue {
                number: self.number.clone(),
                amount,
                balance_due,
            });
        }
        Ok(())
    }

    /// Records a payment against the invoice.
    pub fn apply_payment(&mut self, amount: Decimal) -> Result<(), SettlementError> {
        self.check_payment(amount)?;
        self.paid_amount += amount;
        self.refresh_payment_status();
        Ok(())
    }

    /// Amount a cancelled voucher may take back: never more than was paid.
    #[must_use]
    pub fn reversible_amount(&self, voucher_amount: Decimal) -> Decimal {
        voucher_amount.min(self.paid_amount)
    }

    /// Takes a payment back off the invoice.
    pub fn reverse_payment(&mut self, amount: Decimal) -> Result<(), SettlementError> {
        if self.status == InvoiceStatus::Cancelled {
            return Err(SettlementError::InvoiceCancelled(self.number.clone()));
        }
        if amount <= Decimal::ZERO {
            return Err(SettlementError::AmountNotPositive);
        }
        if amount > self.paid_amount {
            return Err(SettlementError::ExceedsPaidAmount {
                number: self.number.clone(),
                amount,
                paid: self.paid_amount,
            });
        }
        self.paid_amount -= amount;
        self.refresh_payment_status();
        Ok(())
    }

    /// Cancels a posted invoice that has no payments.
    pub fn cancel(&mut self) -> Result<(), SettlementError> {
        if self.status != InvoiceStatus::Posted {
            return Err(SettlementError::InvoiceNotPosted {
                number: self.number.clone(),
                status: self.status,
            });
        }
        if self.paid_amount > Decimal::ZERO {
            return Err(SettlementError::HasPayments(self.number.clone()));
        }
        self.status = InvoiceStatus::Cancelled;
        Ok(())
    }

    fn refresh_payment_status(&mut self) {
        self.payment_status = if self.paid_amount <= Decimal::ZERO {
            PaymentStatus::Unpaid
        } else if self.paid_amount >= self.net_total {
            PaymentStatus::Paid
        } else {
            PaymentStatus::PartiallyPaid
        };
    }
}
