//! Cash payments: money paid out of a cashbox.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CashPaymentId, CashboxId, InvoiceId};
use uuid::Uuid;

use super::cashbox::Cashbox;
use super::error::TreasuryError;
use super::voucher::{self, CashVoucherInput};
use crate::document::{Document, DocumentHeader, DocumentKind};
use crate::ledger::PostingPlan;
use crate::settlement::{Invoice, InvoiceKind};

/// A cash payment voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashPayment {
    /// Unique identifier.
    pub id: CashPaymentId,
    /// Number, date, status and audit fields.
    pub header: DocumentHeader,
    /// Cashbox the money leaves.
    pub cashbox_id: CashboxId,
    /// Account debited.
    pub contra_account_id: AccountId,
    /// Amount paid.
    pub amount: Decimal,
    /// What was paid for.
    pub description: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Supplier name.
    pub supplier: Option<String>,
    /// Purchase invoice settled by this payment.
    pub purchase_invoice_id: Option<InvoiceId>,
}

impl CashPayment {
    /// Creates a draft payment numbered `number`.
    pub fn create(
        number: String,
        input: CashVoucherInput,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TreasuryError> {
        let amount = voucher::checked_amount(input.amount)?;
        let description = voucher::checked_description(&input.description)?;
        Ok(Self {
            id: CashPaymentId::new(),
            header: DocumentHeader::draft(
                DocumentKind::CashPayment,
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
            supplier: input.counterparty,
            purchase_invoice_id: input.invoice_id,
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
        self.supplier = input.counterparty;
        self.purchase_invoice_id = input.invoice_id;
        Ok(())
    }

    /// Checks the linked purchase invoice can absorb this payment.
    pub fn check_invoice(&self, invoice: &Invoice) -> Result<(), TreasuryError> {
        voucher::check_invoice(invoice, InvoiceKind::Purchase, self.amount)
    }

    /// DR contra account, CR cashbox account.
    pub fn posting_plan(&self, cashbox: &Cashbox) -> Result<PostingPlan, TreasuryError> {
        let cash_account = cashbox.posting_account()?;
        Ok(voucher::two_line_plan(
            &self.header,
            self.id.into_inner(),
            &self.description,
            (self.contra_account_id, self.description.clone()),
            (cash_account, cashbox.memo()),
            self.amount,
        ))
    }
}

impl Document for CashPayment {
    const KIND: DocumentKind = DocumentKind::CashPayment;

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
