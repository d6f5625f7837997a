//! Input and helpers shared by cash payments and cash receipts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CashboxId, InvoiceId, round_money};
use uuid::Uuid;

use super::error::TreasuryError;
use crate::document::DocumentHeader;
use crate::ledger::{PlannedLine, PostingPlan};
use crate::settlement::{Invoice, InvoiceKind};

/// Create or update input for a cash payment or receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashVoucherInput {
    /// Business date.
    pub date: NaiveDate,
    /// Cashbox paying or receiving.
    pub cashbox_id: CashboxId,
    /// Other side of the entry (supplier, customer, expense...).
    pub contra_account_id: AccountId,
    /// Amount, rounded to cents on intake.
    pub amount: Decimal,
    /// What the money is for.
    pub description: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Supplier or customer name.
    pub counterparty: Option<String>,
    /// Invoice settled by this voucher.
    pub invoice_id: Option<InvoiceId>,
}

/// Rounds to cents and rejects zero or negative amounts.
pub(crate) fn checked_amount(amount: Decimal) -> Result<Decimal, TreasuryError> {
    let amount = round_money(amount);
    if amount <= Decimal::ZERO {
        return Err(TreasuryError::AmountNotPositive);
    }
    Ok(amount)
}

/// Trims and rejects a blank description.
pub(crate) fn checked_description(description: &str) -> Result<String, TreasuryError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(TreasuryError::DescriptionRequired);
    }
    Ok(description.to_string())
}

/// Checks a linked invoice against the voucher amount.
pub(crate) fn check_invoice(
    invoice: &Invoice,
    expected: InvoiceKind,
    amount: Decimal,
) -> Result<(), TreasuryError> {
    invoice.ensure_kind(expected)?;
    invoice.check_payment(amount)?;
    Ok(())
}

/// One debit and one credit of the same amount.
pub(crate) fn two_line_plan(
    header: &DocumentHeader,
    source_id: Uuid,
    description: &str,
    debit: (AccountId, String),
    credit: (AccountId, String),
    amount: Decimal,
) -> PostingPlan {
    PostingPlan {
        date: header.date,
        description: format!("{} {}: {description}", header.kind, header.number),
        source_type: header.kind.source_type(),
        reference_number: header.number.clone(),
        source_id,
        lines: vec![
            PlannedLine::debit(debit.0, amount, debit.1),
            PlannedLine::credit(credit.0, amount, credit.1),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_checked_amount_rounds_to_cents() {
        assert_eq!(checked_amount(dec!(10.005)).unwrap(), dec!(10.00));
        assert_eq!(checked_amount(dec!(10.015)).unwrap(), dec!(10.02));
        assert_eq!(checked_amount(dec!(0.004)), Err(TreasuryError::AmountNotPositive));
        assert_eq!(checked_amount(dec!(-5)), Err(TreasuryError::AmountNotPositive));
    }

    #[test]
    fn test_checked_description() {
        assert_eq!(checked_description("  Rent ").unwrap(), "Rent");
        assert_eq!(checked_description("   "), Err(TreasuryError::DescriptionRequired));
    }

    #[test]
    fn test_check_invoice_kind_and_balance() {
        let invoice = Invoice::posted("PI-1", InvoiceKind::Purchase, dec!(100.00));
        assert!(check_invoice(&invoice, InvoiceKind::Purchase, dec!(100.00)).is_ok());
        assert!(matches!(
            check_invoice(&invoice, InvoiceKind::Sales, dec!(10.00)),
            Err(TreasuryError::Settlement(_))
        ));
        assert!(matches!(
            check_invoice(&invoice, InvoiceKind::Purchase, dec!(100.01)),
            Err(TreasuryError::Settlement(_))
        ));
    }
}
