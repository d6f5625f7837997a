//! Cash receipt service.

use rust_decimal::Decimal;
use tally_core::settlement::SettlementError;
use tally_core::treasury::{CashReceipt, CashVoucherInput, TreasuryError};
use tally_db::{
    CashboxRepository, Database, DatabaseTransaction, DocumentRepository, InvoiceRepository,
};
use tally_shared::AppResult;
use tally_shared::types::CashReceiptId;
use tracing::{info, instrument};

use crate::auth::{CurrentUser, Permission};
use crate::context::{ServiceContext, finish};
use crate::documents;
use crate::posting;
use crate::registry::{ModuleService, SystemModule};

/// Creates, posts and cancels cash receipts.
#[derive(Debug, Clone)]
pub struct CashReceiptService {
    ctx: ServiceContext,
}

impl ModuleService for CashReceiptService {
    const MODULE: SystemModule = SystemModule::Treasury;
    const NAME: &'static str = "CashReceiptService";
}

/// Checks the references a receipt draft carries.
async fn check_references(txn: &DatabaseTransaction, receipt: &CashReceipt) -> AppResult<()> {
    CashboxRepository::find_by_id(txn, receipt.cashbox_id)
        .await?
        .ok_or(TreasuryError::CashboxNotFound(receipt.cashbox_id))?;
    if let Some(invoice_id) = receipt.sales_invoice_id {
        let invoice = InvoiceRepository::find_by_id(txn, invoice_id)
            .await?
            .ok_or(SettlementError::InvoiceNotFound(invoice_id))?;
        receipt.check_invoice(&invoice)?;
    }
    Ok(())
}

impl CashReceiptService {
    /// Creates the service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Creates a numbered draft.
    #[instrument(skip_all, fields(user = %user.username))]
    pub async fn create(&self, user: &CurrentUser, input: CashVoucherInput) -> AppResult<CashReceipt> {
        user.require(Permission::TreasuryWrite)?;
        let now = self.ctx.clock.now();

        let result: AppResult<CashReceipt> = async {
            let txn = self.ctx.db.begin().await?;
            let number = documents::allocate_number::<CashReceipt>(&txn, &self.ctx).await?;
            let receipt = CashReceipt::create(number, input, &user.username, now)?;
            check_references(&txn, &receipt).await?;
            DocumentRepository::insert(&txn, receipt.clone()).await?;
            Database::commit(txn).await?;
            Ok(receipt)
        }
        .await;
        let receipt = finish("cash_receipt.create", result)?;

        info!(number = %receipt.header.number, amount = %receipt.amount, "Cash receipt created");
        Ok(receipt)
    }

    /// Replaces a draft's fields.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: CashReceiptId,
        input: CashVoucherInput,
    ) -> AppResult<CashReceipt> {
        user.require(Permission::TreasuryWrite)?;

        let result: AppResult<CashReceipt> = async {
            let txn = self.ctx.db.begin().await?;
            let mut receipt = documents::load::<CashReceipt, _>(&txn, id.into_inner()).await?;
            receipt.update(input)?;
            check_references(&txn, &receipt).await?;
            DocumentRepository::update(&txn, receipt.clone()).await?;
            Database::commit(txn).await?;
            Ok(receipt)
        }
        .await;
        let receipt = finish("cash_receipt.update", result)?;

        info!(number = %receipt.header.number, "Cash receipt updated");
        Ok(receipt)
    }

    /// Books the receipt: DR cashbox, CR contra, and settles the linked invoice.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn post(&self, user: &CurrentUser, id: CashReceiptId) -> AppResult<CashReceipt> {
        user.require(Permission::TreasuryPost)?;
        let now = self.ctx.clock.now();

        let result: AppResult<CashReceipt> = async {
            let txn = self.ctx.db.begin().await?;
            let mut receipt = documents::load::<CashReceipt, _>(&txn, id.into_inner()).await?;
            receipt.header.ensure_postable()?;

            let cashbox = CashboxRepository::find_by_id(&txn, receipt.cashbox_id)
                .await?
                .ok_or(TreasuryError::CashboxNotFound(receipt.cashbox_id))?;
            let plan = receipt.posting_plan(&cashbox)?;
            posting::check_plan_accounts(&txn, &plan).await?;
            let period = posting::resolve_period(&txn, receipt.header.date).await?;

            let invoice = match receipt.sales_invoice_id {
                Some(invoice_id) => {
                    let invoice = InvoiceRepository::find_by_id(&txn, invoice_id)
                        .await?
                        .ok_or(SettlementError::InvoiceNotFound(invoice_id))?;
                    receipt.check_invoice(&invoice)?;
                    Some(invoice)
                }
                None => None,
            };

            let journal_id = posting::book(&txn, &self.ctx, plan, &period, &user.username).await?;
            if let Some(mut invoice) = invoice {
                invoice.apply_payment(receipt.amount)?;
                InvoiceRepository::update(&txn, invoice).await?;
            }

            receipt.header.mark_posted(Some(journal_id), now)?;
            DocumentRepository::update(&txn, receipt.clone()).await?;
            Database::commit(txn).await?;
            Ok(receipt)
        }
        .await;
        let receipt = finish("cash_receipt.post", result)?;

        info!(
            number = %receipt.header.number,
            amount = %receipt.amount,
            journal_id = ?receipt.header.journal_entry_id,
            "Cash receipt posted"
        );
        Ok(receipt)
    }

    /// Reverses a posted receipt and reopens the invoice's balance due.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn cancel(&self, user: &CurrentUser, id: CashReceiptId) -> AppResult<CashReceipt> {
        user.require(Permission::TreasuryPost)?;
        let now = self.ctx.clock.now();

        let result: AppResult<CashReceipt> = async {
            let txn = self.ctx.db.begin().await?;
            let mut receipt = documents::load::<CashReceipt, _>(&txn, id.into_inner()).await?;
            receipt.header.ensure_cancellable()?;
            let journal_id = receipt.header.journal_to_reverse()?;

            let reason = documents::cancel_reason(&receipt.header);
            posting::reverse(&txn, &self.ctx, journal_id, &reason, &user.username).await?;

            if let Some(invoice_id) = receipt.sales_invoice_id {
                let mut invoice = InvoiceRepository::find_by_id(&txn, invoice_id)
                    .await?
                    .ok_or(SettlementError::InvoiceNotFound(invoice_id))?;
                let amount = invoice.reversible_amount(receipt.amount);
                if amount > Decimal::ZERO {
                    invoice.reverse_payment(amount)?;
                    InvoiceRepository::update(&txn, invoice).await?;
                }
            }

            receipt.header.mark_cancelled(now)?;
            DocumentRepository::update(&txn, receipt.clone()).await?;
            Database::commit(txn).await?;
            Ok(receipt)
        }
        .await;
        let receipt = finish("cash_receipt.cancel", result)?;

        info!(number = %receipt.header.number, "Cash receipt cancelled");
        Ok(receipt)
    }

    /// Soft-deletes a draft.
    pub async fn delete_draft(&self, user: &CurrentUser, id: CashReceiptId) -> AppResult<CashReceipt> {
        user.require(Permission::TreasuryWrite)?;
        documents::delete_draft(&self.ctx, user, id.into_inner()).await
    }

    /// A live receipt.
    pub async fn get(&self, user: &CurrentUser, id: CashReceiptId) -> AppResult<CashReceipt> {
        user.require(Permission::TreasuryRead)?;
        documents::get(&self.ctx, id.into_inner()).await
    }

    /// Live receipts in creation order.
    pub async fn list(&self, user: &CurrentUser) -> AppResult<Vec<CashReceipt>> {
        user.require(Permission::TreasuryRead)?;
        documents::list(&self.ctx).await
    }

    /// The number the next receipt created today would get.
    pub async fn peek_next_number(&self, user: &CurrentUser) -> AppResult<String> {
        user.require(Permission::TreasuryRead)?;
        documents::peek_next_number::<CashReceipt>(&self.ctx).await
    }
}
