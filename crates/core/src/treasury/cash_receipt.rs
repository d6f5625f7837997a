//! Cash receipts: money received into a cashbox.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CashReceiptId, CashboxId, InvoiceId};
use uuid::Uuid;

use super::cashbox::Cashbox;
use super::error::TreasuryError;
use super::voucher::{self, CashVoucherInput};
use crate::document::{Document, DocumentHeader, DocumentKind};
use crate::ledger::PostingPlan;
use crate::settlement::{Invoice, InvoiceKind};

/// A cash receipt voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashReceipt {
    /// Unique identifier.
    pub id: CashReceiptId,
    /// Number, date, status and audit fields.
    pub header: DocumentHeader,
    /// Cashbox the money enters.
    pub cashbox_id: CashboxId,
    /// Account credited.
    pub contra_account_id: AccountId,
    /// Amount received.
    pub amount: Decimal,
    /// What was received for.
    pub description: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Customer name.
    pub customer: Option<String>,
    /// Sales invoice settled by this receipt.
    pub sales_invoice_id: Option<InvoiceId>,
}

impl CashReceipt {
    /// Creates a draft receipt numbered `number`.
    pub fn create(
        number: String,
        input: CashVoucherInput,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TreasuryError> {
        let amount = voucher::checked_amount(input.amount)?;
        let description = voucher::checked_description(&input.description)?;
        Ok(Self {
            id: CashReceiptId::new(),
            header: DocumentHeader::draft(
                DocumentKind::CashReceipt,
                number,
                input.date,
                created_by,
                created_at,
            ),
            cashbox_id: input.cashbox_id,
            contra_account_id: input.contra_account_id,
            amount,
            description,
            notes: input.notes,
            customer: input.counterparty,
            sales_invoice_id: input.invoice_id,
        })
    }

    /// Replaces the editable fields of a draft.
    pub fn update(&mut self, input: CashVoucherInput) -> Result<(), TreasuryError> {
        self.header.ensure_editable()?;
        let amount = voucher::checked_amount(input.amount)?;
        let description = voucher::checked_description(&input.description)?;

        self.header.date = input.date;
        self.cashbox_id = input.cashbox_id;
        self.contra_account_id = input.contra_account_id;
        self.amount = amount;
        self.description = description;
        self.notes = input.notes;
        self.customer = input.counterparty;
        self.sales_invoice_id = input.invoice_id;
        Ok(())
    }

    /// Checks the linked sales invoice can absorb this receipt.
    pub fn check_invoice(&self, invoice: &Invoice) -> Result<(), TreasuryError> {
        voucher::check_invoice(invoice, InvoiceKind::Sales, self.amount)
    }

    /// DR cashbox account, CR contra account.
    pub fn posting_plan(&self, cashbox: &Cashbox) -> Result<PostingPlan, TreasuryError> {
        let cash_account = cashbox.posting_account()?;
        Ok(voucher::two_line_plan(
            &self.header,
            self.id.into_inner(),
            &self.description,
            (cash_account, cashbox.memo()),
            (self.contra_account_id, self.description.clone()),
            self.amount,
        ))
    }
}

impl Document for CashReceipt {
    const KIND: DocumentKind = DocumentKind::CashReceipt;

    fn source_id(&self) -> Uuid {
        self.id.into_inner()
    }

    fn header(&self) -> &DocumentHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut DocumentHeader {
        &mut self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn input(invoice_id: Option<InvoiceId>) -> CashVoucherInput {
        CashVoucherInput {
            date: NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(),
            cashbox_id: CashboxId::new(),
            contra_account_id: AccountId::new(),
            amount: dec!(200.00),
            description: "Customer settlement".to_string(),
            notes: Some("paid in cash".to_string()),
            counterparty: Some("Acme".to_string()),
            invoice_id,
        }
    }

    #[test]
    fn test_create_requires_description() {
        let mut bad = input(None);
        bad.description = String::new();
        assert_eq!(
            CashReceipt::create("CR-1".to_string(), bad, "bob", Utc::now()).unwrap_err(),
            TreasuryError::DescriptionRequired
        );
    }

    #[test]
    fn test_invoice_over_balance_due_rejected() {
        let invoice = Invoice::posted("SI-202603-0004", InvoiceKind::Sales, dec!(150.00));
        let receipt =
            CashReceipt::create("CR-1".to_string(), input(Some(invoice.id)), "bob", Utc::now())
                .unwrap();

        let err = receipt.check_invoice(&invoice).unwrap_err();
        assert_eq!(err.error_code(), "EXCEEDS_BALANCE_DUE");
    }

    #[test]
    fn test_purchase_invoice_rejected() {
        let invoice = Invoice::posted("PI-1", InvoiceKind::Purchase, dec!(900.00));
        let receipt =
            CashReceipt::create("CR-1".to_string(), input(Some(invoice.id)), "bob", Utc::now())
                .unwrap();
        assert_eq!(
            receipt.check_invoice(&invoice).unwrap_err().error_code(),
            "WRONG_INVOICE_KIND"
        );
    }

    #[test]
    fn test_posting_plan_debits_cashbox() {
        let cash_account = AccountId::new();
        let cashbox = Cashbox::new("FRONT", "Front desk", cash_account);
        let receipt =
            CashReceipt::create("CR-202603-0002".to_string(), input(None), "bob", Utc::now())
                .unwrap();

        let plan = receipt.posting_plan(&cashbox).unwrap();

        assert_eq!(plan.lines[0].account_id, cash_account);
        assert_eq!(plan.lines[0].debit, dec!(200.00));
        assert_eq!(plan.lines[0].memo, "Cashbox FRONT");
        assert_eq!(plan.lines[1].account_id, receipt.contra_account_id);
        assert_eq!(plan.lines[1].credit, dec!(200.00));
        assert_eq!(plan.total_debit(), plan.total_credit());
    }
}
