//! Cash transfers between two cashboxes.
//!
//! The source cashbox must hold the amount at post time, same as a payment.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CashTransferId, CashboxId};
use uuid::Uuid;

use super::cashbox::Cashbox;
use super::error::TreasuryError;
use super::voucher;
use crate::document::{Document, DocumentHeader, DocumentKind};
use crate::ledger::PostingPlan;

/// Create or update input for a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashTransferInput {
    /// Business date.
    pub date: NaiveDate,
    /// Cashbox the money leaves.
    pub from_cashbox_id: CashboxId,
    /// Cashbox the money enters.
    pub to_cashbox_id: CashboxId,
    /// Amount moved.
    pub amount: Decimal,
    /// Why the money moved.
    pub description: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl CashTransferInput {
    fn checked(&self) -> Result<(Decimal, String), TreasuryError> {
        if self.from_cashbox_id == self.to_cashbox_id {
            return Err(TreasuryError::SameCashbox);
        }
        let amount = voucher::checked_amount(self.amount)?;
        let description = voucher::checked_description(&self.description)?;
        Ok((amount, description))
    }
}

/// A cashbox-to-cashbox transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashTransfer {
    /// Unique identifier.
    pub id: CashTransferId,
    /// Number, date, status and audit fields.
    pub header: DocumentHeader,
    /// Source cashbox.
    pub from_cashbox_id: CashboxId,
    /// Target cashbox.
    pub to_cashbox_id: CashboxId,
    /// Amount moved.
    pub amount: Decimal,
    /// Why the money moved.
    pub description: String,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl CashTransfer {
    /// Creates a draft transfer numbered `number`.
    pub fn create(
        number: String,
        input: CashTransferInput,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TreasuryError> {
        let (amount, description) = input.checked()?;
        Ok(Self {
            id: CashTransferId::new(),
            header: DocumentHeader::draft(
                DocumentKind::CashTransfer,
                number,
                input.date,
                created_by,
                created_at,
            ),
            from_cashbox_id: input.from_cashbox_id,
            to_cashbox_id: input.to_cashbox_id,
            amount,
            description,
            notes: input.notes,
        })
    }

    /// Replaces the editable fields of a draft.
    pub fn update(&mut self, input: CashTransferInput) -> Result<(), TreasuryError> {
        self.header.ensure_editable()?;
        let (amount, description) = input.checked()?;

        self.header.date = input.date;
        self.from_cashbox_id = input.from_cashbox_id;
        self.to_cashbox_id = input.to_cashbox_id;
        self.amount = amount;
        self.description = description;
        self.notes = input.notes;
        Ok(())
    }

    /// DR target cashbox account, CR source cashbox account.
    pub fn posting_plan(&self, from: &Cashbox, to: &Cashbox) -> Result<PostingPlan, TreasuryError> {
        let from_account = from.posting_account()?;
        let to_account = to.posting_account()?;
        Ok(voucher::two_line_plan(
            &self.header,
            self.id.into_inner(),
            &self.description,
            (to_account, to.memo()),
            (from_account, from.memo()),
            self.amount,
        ))
    }
}

impl Document for CashTransfer {
    const KIND: DocumentKind = DocumentKind::CashTransfer;

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
