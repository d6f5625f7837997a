//! Cash transfer service.

use tally_core::treasury::{CashTransfer, CashTransferInput, Cashbox, TreasuryError};
use tally_db::{CashboxRepository, Database, DatabaseTransaction, DocumentRepository};
use tally_shared::AppResult;
use tally_shared::types::{CashTransferId, CashboxId};
use tracing::{info, instrument};

use crate::auth::{CurrentUser, Permission};
use crate::context::{ServiceContext, finish};
use crate::documents;
use crate::posting;
use crate::registry::{ModuleService, SystemModule};

/// Moves cash between cashboxes.
#[derive(Debug, Clone)]
pub struct CashTransferService {
    ctx: ServiceContext,
}

impl ModuleService for CashTransferService {
    const MODULE: SystemModule = SystemModule::Treasury;
    const NAME: &'static str = "CashTransferService";
}

async fn cashbox(txn: &DatabaseTransaction, id: CashboxId) -> AppResult<Cashbox> {
    Ok(CashboxRepository::find_by_id(txn, id)
        .await?
        .ok_or(TreasuryError::CashboxNotFound(id))?)
}

impl CashTransferService {
    /// Creates the service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Creates a numbered draft.
    #[instrument(skip_all, fields(user = %user.username))]
    pub async fn create(&self, user: &CurrentUser, input: CashTransferInput) -> AppResult<CashTransfer> {
        user.require(Permission::TreasuryWrite)?;
        let now = self.ctx.clock.now();

        let result: AppResult<CashTransfer> = async {
            let txn = self.ctx.db.begin().await?;
            let number = documents::allocate_number::<CashTransfer>(&txn, &self.ctx).await?;
            let transfer = CashTransfer::create(number, input, &user.username, now)?;
            cashbox(&txn, transfer.from_cashbox_id).await?;
            cashbox(&txn, transfer.to_cashbox_id).await?;
            DocumentRepository::insert(&txn, transfer.clone()).await?;
            Database::commit(txn).await?;
            Ok(transfer)
        }
        .await;
        let transfer = finish("cash_transfer.create", result)?;

        info!(number = %transfer.header.number, amount = %transfer.amount, "Cash transfer created");
        Ok(transfer)
    }

    /// Replaces a draft's fields.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: CashTransferId,
        input: CashTransferInput,
    ) -> AppResult<CashTransfer> {
        user.require(Permission::TreasuryWrite)?;

        let result: AppResult<CashTransfer> = async {
            let txn = self.ctx.db.begin().await?;
            let mut transfer = documents::load::<CashTransfer, _>(&txn, id.into_inner()).await?;
            transfer.update(input)?;
            cashbox(&txn, transfer.from_cashbox_id).await?;
            cashbox(&txn, transfer.to_cashbox_id).await?;
            DocumentRepository::update(&txn, transfer.clone()).await?;
            Database::commit(txn).await?;
            Ok(transfer)
        }
        .await;
        let transfer = finish("cash_transfer.update", result)?;

        info!(number = %transfer.header.number, "Cash transfer updated");
        Ok(transfer)
    }

    /// Books the transfer: DR target cashbox, CR source cashbox.
    ///
    /// The source cashbox must cover the amount.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn post(&self, user: &CurrentUser, id: CashTransferId) -> AppResult<CashTransfer> {
        user.require(Permission::TreasuryPost)?;
        let now = self.ctx.clock.now();

        let result: AppResult<CashTransfer> = async {
            let txn = self.ctx.db.begin().await?;
            let mut transfer = documents::load::<CashTransfer, _>(&txn, id.into_inner()).await?;
            transfer.header.ensure_postable()?;

            let from = cashbox(&txn, transfer.from_cashbox_id).await?;
            let to = cashbox(&txn, transfer.to_cashbox_id).await?;
            let plan = transfer.posting_plan(&from, &to)?;
            posting::check_plan_accounts(&txn, &plan).await?;
            let period = posting::resolve_period(&txn, transfer.header.date).await?;

            let available = CashboxRepository::gl_balance(&txn, &from).await?;
            from.ensure_covers(available, transfer.amount)?;

            let journal_id = posting::book(&txn, &self.ctx, plan, &period, &user.username).await?;
            transfer.header.mark_posted(Some(journal_id), now)?;
            DocumentRepository::update(&txn, transfer.clone()).await?;
            Database::commit(txn).await?;
            Ok(transfer)
        }
        .await;
        let transfer = finish("cash_transfer.post", result)?;

        info!(
            number = %transfer.header.number,
            amount = %transfer.amount,
            journal_id = ?transfer.header.journal_entry_id,
            "Cash transfer posted"
        );
        Ok(transfer)
    }

    /// Reverses a posted transfer.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn cancel(&self, user: &CurrentUser, id: CashTransferId) -> AppResult<CashTransfer> {
        user.require(Permission::TreasuryPost)?;
        let now = self.ctx.clock.now();

        let result: AppResult<CashTransfer> = async {
            let txn = self.ctx.db.begin().await?;
            let mut transfer = documents::load::<CashTransfer, _>(&txn, id.into_inner()).await?;
            transfer.header.ensure_cancellable()?;
            let journal_id = transfer.header.journal_to_reverse()?;

            let reason = documents::cancel_reason(&transfer.header);
            posting::reverse(&txn, &self.ctx, journal_id, &reason, &user.username).await?;

            transfer.header.mark_cancelled(now)?;
            DocumentRepository::update(&txn, transfer.clone()).await?;
            Database::commit(txn).await?;
            Ok(transfer)
        }
        .await;
        let transfer = finish("cash_transfer.cancel", result)?;

        info!(number = %transfer.header.number, "Cash transfer cancelled");
        Ok(transfer)
    }

    /// Soft-deletes a draft.
    pub async fn delete_draft(&self, user: &CurrentUser, id: CashTransferId) -> AppResult<CashTransfer> {
        user.require(Permission::TreasuryWrite)?;
        documents::delete_draft(&self.ctx, user, id.into_inner()).await
    }

    /// A live transfer.
    pub async fn get(&self, user: &CurrentUser, id: CashTransferId) -> AppResult<CashTransfer> {
        user.require(Permission::TreasuryRead)?;
        documents::get(&self.ctx, id.into_inner()).await
    }

    /// Live transfers in creation order.
    pub async fn list(&self, user: &CurrentUser) -> AppResult<Vec<CashTransfer>> {
        user.require(Permission::TreasuryRead)?;
        documents::list(&self.ctx).await
    }

    /// The number the next transfer created today would get.
    pub async fn peek_next_number(&self, user: &CurrentUser) -> AppResult<String> {
        user.require(Permission::TreasuryRead)?;
        documents::peek_next_number::<CashTransfer>(&self.ctx).await
    }
}
