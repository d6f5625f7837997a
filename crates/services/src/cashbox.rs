//! Cashbox registration, activation and balances.

use rust_decimal::Decimal;
use tally_core::treasury::{Cashbox, TreasuryError};
use tally_db::{CashboxRepository, Database};
use tally_shared::types::{AccountId, CashboxId};
use tally_shared::{AppError, AppResult};
use tracing::{info, instrument};

use crate::auth::{CurrentUser, Permission};
use crate::context::{ServiceContext, finish};
use crate::posting;
use crate::registry::{ModuleService, SystemModule};

/// Cashbox service.
#[derive(Debug, Clone)]
pub struct CashboxService {
    ctx: ServiceContext,
}

impl ModuleService for CashboxService {
    const MODULE: SystemModule = SystemModule::Treasury;
    const NAME: &'static str = "CashboxService";
}

impl CashboxService {
    /// Creates the service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Registers a cashbox backed by a postable ledger account.
    #[instrument(skip_all, fields(user = %user.username, code = %code))]
    pub async fn create(
        &self,
        user: &CurrentUser,
        code: &str,
        name: &str,
        account_id: AccountId,
    ) -> AppResult<Cashbox> {
        user.require(Permission::TreasuryWrite)?;

        let result: AppResult<Cashbox> = async {
            let txn = self.ctx.db.begin().await?;
            posting::postable_account(&txn, account_id).await?;
            let cashbox = Cashbox::new(code, name, account_id);
            CashboxRepository::insert(&txn, cashbox.clone()).await?;
            Database::commit(txn).await?;
            Ok(cashbox)
        }
        .await;
        let cashbox = finish("cashbox.create", result)?;

        info!(cashbox_id = %cashbox.id, code = %cashbox.code, "Cashbox created");
        Ok(cashbox)
    }

    /// Lets a cashbox take postings again.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn activate(&self, user: &CurrentUser, id: CashboxId) -> AppResult<Cashbox> {
        user.require(Permission::TreasuryWrite)?;
        let cashbox = self.set_active("cashbox.activate", id, true).await?;
        info!(code = %cashbox.code, "Cashbox activated");
        Ok(cashbox)
    }

    /// Stops new postings against a cashbox. Its balance stays readable.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn deactivate(&self, user: &CurrentUser, id: CashboxId) -> AppResult<Cashbox> {
        user.require(Permission::TreasuryWrite)?;
        let cashbox = self.set_active("cashbox.deactivate", id, false).await?;
        info!(code = %cashbox.code, "Cashbox deactivated");
        Ok(cashbox)
    }

    async fn set_active(
        &self,
        operation: &'static str,
        id: CashboxId,
        active: bool,
    ) -> AppResult<Cashbox> {
        let result: AppResult<Cashbox> = async {
            let txn = self.ctx.db.begin().await?;
            let mut cashbox = CashboxRepository::find_by_id(&txn, id)
                .await?
                .ok_or(TreasuryError::CashboxNotFound(id))?;
            cashbox.is_active = active;
            CashboxRepository::update(&txn, cashbox.clone()).await?;
            Database::commit(txn).await?;
            Ok(cashbox)
        }
        .await;
        finish(operation, result)
    }

    /// A cashbox by id.
    pub async fn get(&self, user: &CurrentUser, id: CashboxId) -> AppResult<Cashbox> {
        user.require(Permission::TreasuryRead)?;
        let found = CashboxRepository::find_by_id(self.ctx.db.connection(), id).await;
        finish(
            "cashbox.get",
            found
                .map_err(AppError::from)
                .and_then(|c| Ok(c.ok_or(TreasuryError::CashboxNotFound(id))?)),
        )
    }

    /// Balance of the cashbox's ledger account from posted lines.
    pub async fn balance(&self, user: &CurrentUser, id: CashboxId) -> AppResult<Decimal> {
        user.require(Permission::TreasuryRead)?;
        let db = self.ctx.db.connection();
        let result: AppResult<Decimal> = async {
            let cashbox = CashboxRepository::find_by_id(db, id)
                .await?
                .ok_or(TreasuryError::CashboxNotFound(id))?;
            Ok(CashboxRepository::gl_balance(db, &cashbox).await?)
        }
        .await;
        finish("cashbox.balance", result)
    }
}
