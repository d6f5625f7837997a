//! Inventory adjustment service.
//!
//! Posting moves stock first and books the cost difference second, so a
//! shortage the warehouse cannot cover fails before any journal exists.
//! An adjustment whose lines net to zero cost moves stock without a
//! journal entry.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tally_core::document::DocumentHeader;
use tally_core::inventory::{
    AdjustmentAccounts, AdjustmentLineInput, InventoryAdjustment, InventoryAdjustmentInput,
    InventoryMovement, StockChange,
};
use tally_db::{Database, DatabaseTransaction, DocumentRepository, StockRepository};
use tally_shared::{AppError, AppResult};
use tally_shared::types::{InventoryAdjustmentId, ProductId, WarehouseId};
use tracing::{debug, info, instrument};

use crate::auth::{CurrentUser, Permission};
use crate::context::{ServiceContext, finish};
use crate::documents;
use crate::posting;
use crate::registry::{ModuleService, SystemModule};

/// Creates, posts and cancels inventory adjustments.
#[derive(Debug, Clone)]
pub struct InventoryAdjustmentService {
    ctx: ServiceContext,
}

impl ModuleService for InventoryAdjustmentService {
    const MODULE: SystemModule = SystemModule::Inventory;
    const NAME: &'static str = "InventoryAdjustmentService";
}

/// Applies `changes` to the warehouse and appends one movement per change.
async fn move_stock(
    txn: &DatabaseTransaction,
    warehouse_id: WarehouseId,
    changes: impl IntoIterator<Item = StockChange>,
    source: &DocumentHeader,
    date: NaiveDate,
    at: DateTime<Utc>,
) -> AppResult<Vec<InventoryMovement>> {
    let mut movements = Vec::new();
    for change in changes {
        let mut stock = StockRepository::get_or_create(txn, warehouse_id, change.product_id).await?;
        let movement = change.apply(&mut stock, source, date, at)?;
        debug!(
            product_id = %change.product_id,
            direction = %change.direction,
            quantity = %change.quantity,
            balance_after = %movement.balance_after,
            "Stock moved"
        );
        StockRepository::save(txn, stock).await?;
        movements.push(movement);
    }
    Ok(movements)
}

impl InventoryAdjustmentService {
    /// Creates the service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    async fn accounts(&self, txn: &DatabaseTransaction) -> AppResult<AdjustmentAccounts> {
        let codes = &self.ctx.config.accounts;
        Ok(AdjustmentAccounts {
            inventory: posting::postable_account_by_code(txn, &codes.inventory).await?.id,
            income: posting::postable_account_by_code(txn, &codes.adjustment_income).await?.id,
            expense: posting::postable_account_by_code(txn, &codes.adjustment_expense).await?.id,
        })
    }

    /// Runs `edit` on a draft and stores the result.
    async fn edit_draft<F>(
        &self,
        operation: &'static str,
        id: InventoryAdjustmentId,
        edit: F,
    ) -> AppResult<InventoryAdjustment>
    where
        F: FnOnce(&mut InventoryAdjustment) -> AppResult<()> + Send,
    {
        let result: AppResult<InventoryAdjustment> = async {
            let txn = self.ctx.db.begin().await?;
            let mut adjustment =
                documents::load::<InventoryAdjustment, _>(&txn, id.into_inner()).await?;
            edit(&mut adjustment)?;
            DocumentRepository::update(&txn, adjustment.clone()).await?;
            Database::commit(txn).await?;
            Ok(adjustment)
        }
        .await;
        finish(operation, result)
    }

    /// Creates a numbered draft.
    #[instrument(skip_all, fields(user = %user.username))]
    pub async fn create(
        &self,
        user: &CurrentUser,
        input: InventoryAdjustmentInput,
    ) -> AppResult<InventoryAdjustment> {
        user.require(Permission::InventoryWrite)?;
        let now = self.ctx.clock.now();

        let result: AppResult<InventoryAdjustment> = async {
            let txn = self.ctx.db.begin().await?;
            let number = documents::allocate_number::<InventoryAdjustment>(&txn, &self.ctx).await?;
            let adjustment = InventoryAdjustment::create(number, input, &user.username, now)?;
            DocumentRepository::insert(&txn, adjustment.clone()).await?;
            Database::commit(txn).await?;
            Ok(adjustment)
        }
        .await;
        let adjustment = finish("inventory_adjustment.create", result)?;

        info!(
            number = %adjustment.header.number,
            lines = adjustment.lines().len(),
            "Inventory adjustment created"
        );
        Ok(adjustment)
    }

    /// Replaces a draft's header and lines.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: InventoryAdjustmentId,
        input: InventoryAdjustmentInput,
    ) -> AppResult<InventoryAdjustment> {
        user.require(Permission::InventoryWrite)?;
        let adjustment = self
            .edit_draft("inventory_adjustment.update", id, |a| Ok(a.update(input)?))
            .await?;
        info!(number = %adjustment.header.number, "Inventory adjustment updated");
        Ok(adjustment)
    }

    /// Appends a line to a draft.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn add_line(
        &self,
        user: &CurrentUser,
        id: InventoryAdjustmentId,
        line: AdjustmentLineInput,
    ) -> AppResult<InventoryAdjustment> {
        user.require(Permission::InventoryWrite)?;
        self.edit_draft("inventory_adjustment.add_line", id, |a| {
            a.add_line(line)?;
            Ok(())
        })
        .await
    }

    /// Removes a line from a draft.
    #[instrument(skip_all, fields(user = %user.username, id = %id, line = line_number))]
    pub async fn remove_line(
        &self,
        user: &CurrentUser,
        id: InventoryAdjustmentId,
        line_number: u32,
    ) -> AppResult<InventoryAdjustment> {
        user.require(Permission::InventoryWrite)?;
        self.edit_draft("inventory_adjustment.remove_line", id, |a| {
            Ok(a.remove_line(line_number)?)
        })
        .await
    }

    /// Moves stock to the counted quantities and books the cost difference.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn post(
        &self,
        user: &CurrentUser,
        id: InventoryAdjustmentId,
    ) -> AppResult<InventoryAdjustment> {
        user.require(Permission::InventoryPost)?;
        let now = self.ctx.clock.now();

        let result: AppResult<InventoryAdjustment> = async {
            let txn = self.ctx.db.begin().await?;
            let mut adjustment =
                documents::load::<InventoryAdjustment, _>(&txn, id.into_inner()).await?;
            adjustment.header.ensure_postable()?;
            adjustment.ensure_has_lines()?;

            let accounts = self.accounts(&txn).await?;
            let period = posting::resolve_period(&txn, adjustment.header.date).await?;

            let movements = move_stock(
                &txn,
                adjustment.warehouse_id,
                adjustment.stock_changes(),
                &adjustment.header,
                adjustment.header.date,
                now,
            )
            .await?;

            let plan = adjustment.posting_plan(&accounts)?;
            let journal_id = if plan.is_empty() {
                None
            } else {
                Some(posting::book(&txn, &self.ctx, plan, &period, &user.username).await?)
            };

            for movement in movements {
                StockRepository::record_movement(&txn, movement).await?;
            }
            adjustment.header.mark_posted(journal_id, now)?;
            DocumentRepository::update(&txn, adjustment.clone()).await?;
            Database::commit(txn).await?;
            Ok(adjustment)
        }
        .await;
        let adjustment = finish("inventory_adjustment.post", result)?;

        info!(
            number = %adjustment.header.number,
            surplus = ?adjustment.surplus_total().ok(),
            shortage = ?adjustment.shortage_total().ok(),
            journal_id = ?adjustment.header.journal_entry_id,
            "Inventory adjustment posted"
        );
        Ok(adjustment)
    }

    /// Restores stock and reverses the journal of a posted adjustment.
    ///
    /// Inverse movements are dated today.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn cancel(
        &self,
        user: &CurrentUser,
        id: InventoryAdjustmentId,
    ) -> AppResult<InventoryAdjustment> {
        user.require(Permission::InventoryPost)?;
        let now = self.ctx.clock.now();
        let today = self.ctx.clock.today();

        let result: AppResult<InventoryAdjustment> = async {
            let txn = self.ctx.db.begin().await?;
            let mut adjustment =
                documents::load::<InventoryAdjustment, _>(&txn, id.into_inner()).await?;
            adjustment.header.ensure_cancellable()?;

            let has_cost = adjustment.surplus_total()? > Decimal::ZERO
                || adjustment.shortage_total()? > Decimal::ZERO;
            if adjustment.header.journal_entry_id.is_some() || has_cost {
                let journal_id = adjustment.header.journal_to_reverse()?;
                let reason = documents::cancel_reason(&adjustment.header);
                posting::reverse(&txn, &self.ctx, journal_id, &reason, &user.username).await?;
            } else {
                posting::resolve_period(&txn, today).await?;
            }

            let inverse = adjustment.stock_changes().into_iter().map(StockChange::inverse);
            let movements =
                move_stock(&txn, adjustment.warehouse_id, inverse, &adjustment.header, today, now)
                    .await?;
            for movement in movements {
                StockRepository::record_movement(&txn, movement).await?;
            }

            adjustment.header.mark_cancelled(now)?;
            DocumentRepository::update(&txn, adjustment.clone()).await?;
            Database::commit(txn).await?;
            Ok(adjustment)
        }
        .await;
        let adjustment = finish("inventory_adjustment.cancel", result)?;

        info!(number = %adjustment.header.number, "Inventory adjustment cancelled");
        Ok(adjustment)
    }

    /// Soft-deletes a draft.
    pub async fn delete_draft(
        &self,
        user: &CurrentUser,
        id: InventoryAdjustmentId,
    ) -> AppResult<InventoryAdjustment> {
        user.require(Permission::InventoryWrite)?;
        documents::delete_draft(&self.ctx, user, id.into_inner()).await
    }

    /// A live adjustment.
    pub async fn get(
        &self,
        user: &CurrentUser,
        id: InventoryAdjustmentId,
    ) -> AppResult<InventoryAdjustment> {
        user.require(Permission::InventoryRead)?;
        documents::get(&self.ctx, id.into_inner()).await
    }

    /// Live adjustments in creation order.
    pub async fn list(&self, user: &CurrentUser) -> AppResult<Vec<InventoryAdjustment>> {
        user.require(Permission::InventoryRead)?;
        documents::list(&self.ctx).await
    }

    /// The number the next adjustment created today would get.
    pub async fn peek_next_number(&self, user: &CurrentUser) -> AppResult<String> {
        user.require(Permission::InventoryRead)?;
        documents::peek_next_number::<InventoryAdjustment>(&self.ctx).await
    }

    /// Quantity of a product on hand in a warehouse.
    pub async fn stock_level(
        &self,
        user: &CurrentUser,
        warehouse_id: WarehouseId,
        product_id: ProductId,
    ) -> AppResult<Decimal> {
        user.require(Permission::InventoryRead)?;
        let quantity =
            StockRepository::quantity(self.ctx.db.connection(), warehouse_id, product_id).await;
        finish("stock_level", quantity.map_err(AppError::from))
    }

    /// Movements written by an adjustment, oldest first.
    pub async fn movements(
        &self,
        user: &CurrentUser,
        id: InventoryAdjustmentId,
    ) -> AppResult<Vec<InventoryMovement>> {
        user.require(Permission::InventoryRead)?;
        let db = self.ctx.db.connection();
        let result: AppResult<Vec<InventoryMovement>> = async {
            let adjustment = documents::load::<InventoryAdjustment, _>(db, id.into_inner()).await?;
            Ok(StockRepository::movements_for(db, &adjustment.header.number).await?)
        }
        .await;
        finish("movements", result)
    }
}
