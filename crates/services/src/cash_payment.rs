//! Cash payment service.

use rust_decimal::Decimal;
use tally_core::settlement::SettlementError;
use tally_core::treasury::{CashPayment, CashVoucherInput, TreasuryError};
use tally_db::{
    CashboxRepository, Database, DatabaseTransaction, DocumentRepository, InvoiceRepository,
};
use tally_shared::AppResult;
use tally_shared::types::CashPaymentId;
use tracing::{info, instrument};

use crate::auth::{CurrentUser, Permission};
use crate::context::{ServiceContext, finish};
use crate::documents;
use crate::posting;
use crate::registry::{ModuleService, SystemModule};

/// Creates, posts and cancels cash payments.
#[derive(Debug, Clone)]
pub struct CashPaymentService {
    ctx: ServiceContext,
}

impl ModuleService for CashPaymentService {
    const MODULE: SystemModule = SystemModule::Treasury;
    const NAME: &'static str = "CashPaymentService";
}

/// Checks the references a payment draft carries.
async fn check_references(txn: &DatabaseTransaction, payment: &CashPayment) -> AppResult<()> {
    CashboxRepository::find_by_id(txn, payment.cashbox_id)
        .await?
        .ok_or(TreasuryError::CashboxNotFound(payment.cashbox_id))?;
    if let Some(invoice_id) = payment.purchase_invoice_id {
        let invoice = InvoiceRepository::find_by_id(txn, invoice_id)
            .await?
            .ok_or(SettlementError::InvoiceNotFound(invoice_id))?;
        payment.check_invoice(&invoice)?;
    }
    Ok(())
}

impl CashPaymentService {
    /// Creates the service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Creates a numbered draft.
    #[instrument(skip_all, fields(user = %user.username))]
    pub async fn create(&self, user: &CurrentUser, input: CashVoucherInput) -> AppResult<CashPayment> {
        user.require(Permission::TreasuryWrite)?;
        let now = self.ctx.clock.now();

        let result: AppResult<CashPayment> = async {
            let txn = self.ctx.db.begin().await?;
            let number = documents::allocate_number::<CashPayment>(&txn, &self.ctx).await?;
            let payment = CashPayment::create(number, input, &user.username, now)?;
            check_references(&txn, &payment).await?;
            DocumentRepository::insert(&txn, payment.clone()).await?;
            Database::commit(txn).await?;
            Ok(payment)
        }
        .await;
        let payment = finish("cash_payment.create", result)?;

        info!(number = %payment.header.number, amount = %payment.amount, "Cash payment created");
        Ok(payment)
    }

    /// Replaces a draft's fields.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: CashPaymentId,
        input: CashVoucherInput,
    ) -> AppResult<CashPayment> {
        user.require(Permission::TreasuryWrite)?;

        let result: AppResult<CashPayment> = async {
            let txn = self.ctx.db.begin().await?;
            let mut payment = documents::load::<CashPayment, _>(&txn, id.into_inner()).await?;
            payment.update(input)?;
            check_references(&txn, &payment).await?;
            DocumentRepository::update(&txn, payment.clone()).await?;
            Database::commit(txn).await?;
            Ok(payment)
        }
        .await;
        let payment = finish("cash_payment.update", result)?;

        info!(number = %payment.header.number, "Cash payment updated");
        Ok(payment)
    }

    /// Books the payment: DR contra, CR cashbox, and settles the linked invoice.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn post(&self, user: &CurrentUser, id: CashPaymentId) -> AppResult<CashPayment> {
        user.require(Permission::TreasuryPost)?;
        let now = self.ctx.clock.now();

        let result: AppResult<CashPayment> = async {
            let txn = self.ctx.db.begin().await?;
            let mut payment = documents::load::<CashPayment, _>(&txn, id.into_inner()).await?;
            payment.header.ensure_postable()?;

            let cashbox = CashboxRepository::find_by_id(&txn, payment.cashbox_id)
                .await?
                .ok_or(TreasuryError::CashboxNotFound(payment.cashbox_id))?;
            let plan = payment.posting_plan(&cashbox)?;
            posting::check_plan_accounts(&txn, &plan).await?;
            let period = posting::resolve_period(&txn, payment.header.date).await?;

            let available = CashboxRepository::gl_balance(&txn, &cashbox).await?;
            cashbox.ensure_covers(available, payment.amount)?;
            let invoice = match payment.purchase_invoice_id {
                Some(invoice_id) => {
                    let invoice = InvoiceRepository::find_by_id(&txn, invoice_id)
                        .await?
                        .ok_or(SettlementError::InvoiceNotFound(invoice_id))?;
                    payment.check_invoice(&invoice)?;
                    Some(invoice)
                }
                None => None,
            };

            let journal_id = posting::book(&txn, &self.ctx, plan, &period, &user.username).await?;
            if let Some(mut invoice) = invoice {
                invoice.apply_payment(payment.amount)?;
                InvoiceRepository::update(&txn, invoice).await?;
            }

            payment.header.mark_posted(Some(journal_id), now)?;
            DocumentRepository::update(&txn, payment.clone()).await?;
            Database::commit(txn).await?;
            Ok(payment)
        }
        .await;
        let payment = finish("cash_payment.post", result)?;

        info!(
            number = %payment.header.number,
            amount = %payment.amount,
            journal_id = ?payment.header.journal_entry_id,
            "Cash payment posted"
        );
        Ok(payment)
    }

    /// Reverses a posted payment and gives the invoice its balance back.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn cancel(&self, user: &CurrentUser, id: CashPaymentId) -> AppResult<CashPayment> {
        user.require(Permission::TreasuryPost)?;
        let now = self.ctx.clock.now();

        let result: AppResult<CashPayment> = async {
            let txn = self.ctx.db.begin().await?;
            let mut payment = documents::load::<CashPayment, _>(&txn, id.into_inner()).await?;
            payment.header.ensure_cancellable()?;
            let journal_id = payment.header.journal_to_reverse()?;

            let reason = documents::cancel_reason(&payment.header);
            posting::reverse(&txn, &self.ctx, journal_id, &reason, &user.username).await?;

            if let Some(invoice_id) = payment.purchase_invoice_id {
                let mut invoice = InvoiceRepository::find_by_id(&txn, invoice_id)
                    .await?
                    .ok_or(SettlementError::InvoiceNotFound(invoice_id))?;
                let amount = invoice.reversible_amount(payment.amount);
                if amount > Decimal::ZERO {
                    invoice.reverse_payment(amount)?;
                    InvoiceRepository::update(&txn, invoice).await?;
                }
            }

            payment.header.mark_cancelled(now)?;
            DocumentRepository::update(&txn, payment.clone()).await?;
            Database::commit(txn).await?;
            Ok(payment)
        }
        .await;
        let payment = finish("cash_payment.cancel", result)?;

        info!(number = %payment.header.number, "Cash payment cancelled");
        Ok(payment)
    }

    /// Soft-deletes a draft.
    pub async fn delete_draft(&self, user: &CurrentUser, id: CashPaymentId) -> AppResult<CashPayment> {
        user.require(Permission::TreasuryWrite)?;
        documents::delete_draft(&self.ctx, user, id.into_inner()).await
    }

    /// A live payment.
    pub async fn get(&self, user: &CurrentUser, id: CashPaymentId) -> AppResult<CashPayment> {
        user.require(Permission::TreasuryRead)?;
        documents::get(&self.ctx, id.into_inner()).await
    }

    /// Live payments in creation order.
    pub async fn list(&self, user: &CurrentUser) -> AppResult<Vec<CashPayment>> {
        user.require(Permission::TreasuryRead)?;
        documents::list(&self.ctx).await
    }

    /// The number the next payment created today would get.
    pub async fn peek_next_number(&self, user: &CurrentUser) -> AppResult<String> {
        user.require(Permission::TreasuryRead)?;
        documents::peek_next_number::<CashPayment>(&self.ctx).await
    }
}
