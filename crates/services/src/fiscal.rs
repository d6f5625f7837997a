//! Fiscal calendar administration.
//!
//! Opening, activating and closing periods are the only ways the posting
//! gate changes its answer.

use tally_core::fiscal::{FiscalError, FiscalYear};
use tally_db::{Database, FiscalRepository};
use tally_shared::{AppError, AppResult};
use tally_shared::types::FiscalYearId;
use tracing::{info, instrument};

use crate::auth::{CurrentUser, Permission};
use crate::context::{ServiceContext, finish};
use crate::registry::{ModuleService, SystemModule};

/// Fiscal year service.
#[derive(Debug, Clone)]
pub struct FiscalYearService {
    ctx: ServiceContext,
}

impl ModuleService for FiscalYearService {
    const MODULE: SystemModule = SystemModule::Fiscal;
    const NAME: &'static str = "FiscalYearService";
}

impl FiscalYearService {
    /// Creates the service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Loads a year, changes it and saves it in one unit of work.
    async fn modify<F>(&self, operation: &'static str, id: FiscalYearId, change: F) -> AppResult<FiscalYear>
    where
        F: FnOnce(&mut FiscalYear) -> Result<(), FiscalError> + Send,
    {
        let result: AppResult<FiscalYear> = async {
            let txn = self.ctx.db.begin().await?;
            let mut year = FiscalRepository::find_by_id(&txn, id)
                .await?
                .ok_or(FiscalError::YearNotFound(id))?;
            change(&mut year)?;
            FiscalRepository::update(&txn, year.clone()).await?;
            Database::commit(txn).await?;
            Ok(year)
        }
        .await;
        finish(operation, result)
    }

    /// Creates a calendar year in Setup with twelve open periods.
    #[instrument(skip_all, fields(user = %user.username, year = year))]
    pub async fn create_year(&self, user: &CurrentUser, year: i32) -> AppResult<FiscalYear> {
        user.require(Permission::FiscalManage)?;

        let result: AppResult<FiscalYear> = async {
            let txn = self.ctx.db.begin().await?;
            let fiscal_year = FiscalYear::new(year)?;
            FiscalRepository::insert(&txn, fiscal_year.clone()).await?;
            Database::commit(txn).await?;
            Ok(fiscal_year)
        }
        .await;
        let created = finish("fiscal.create_year", result)?;

        info!(fiscal_year_id = %created.id, year, "Fiscal year created");
        Ok(created)
    }

    /// Makes a year the one that receives postings.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn activate(&self, user: &CurrentUser, id: FiscalYearId) -> AppResult<FiscalYear> {
        user.require(Permission::FiscalManage)?;

        let result: AppResult<FiscalYear> = async {
            let txn = self.ctx.db.begin().await?;
            if let Some(active) = FiscalRepository::find_active(&txn)
                .await?
                .filter(|a| a.id != id)
            {
                return Err(FiscalError::AnotherYearActive(active.year).into());
            }
            let mut year = FiscalRepository::find_by_id(&txn, id)
                .await?
                .ok_or(FiscalError::YearNotFound(id))?;
            year.activate()?;
            FiscalRepository::update(&txn, year.clone()).await?;
            Database::commit(txn).await?;
            Ok(year)
        }
        .await;
        let year = finish("fiscal.activate", result)?;

        info!(year = year.year, "Fiscal year activated");
        Ok(year)
    }

    /// Closes one month to posting.
    #[instrument(skip_all, fields(user = %user.username, id = %id, month = month))]
    pub async fn close_period(
        &self,
        user: &CurrentUser,
        id: FiscalYearId,
        month: u32,
    ) -> AppResult<FiscalYear> {
        user.require(Permission::FiscalManage)?;
        let now = self.ctx.clock.now();

        let year = self
            .modify("fiscal.close_period", id, |year| {
                year.close_period(month, &user.username, now).map(|_| ())
            })
            .await?;

        info!(year = year.year, month, "Fiscal period closed");
        Ok(year)
    }

    /// Reopens a closed month, recording why.
    #[instrument(skip_all, fields(user = %user.username, id = %id, month = month))]
    pub async fn reopen_period(
        &self,
        user: &CurrentUser,
        id: FiscalYearId,
        month: u32,
        reason: &str,
    ) -> AppResult<FiscalYear> {
        user.require(Permission::FiscalManage)?;

        let year = self
            .modify("fiscal.reopen_period", id, |year| {
                year.reopen_period(month, reason).map(|_| ())
            })
            .await?;

        info!(year = year.year, month, reason, "Fiscal period reopened");
        Ok(year)
    }

    /// Closes an active year whose periods are all closed.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn close_year(&self, user: &CurrentUser, id: FiscalYearId) -> AppResult<FiscalYear> {
        user.require(Permission::FiscalManage)?;
        let now = self.ctx.clock.now();

        let year = self
            .modify("fiscal.close_year", id, |year| year.close(&user.username, now))
            .await?;

        info!(year = year.year, "Fiscal year closed");
        Ok(year)
    }

    /// The active year, if any.
    pub async fn active(&self, user: &CurrentUser) -> AppResult<FiscalYear> {
        user.require(Permission::LedgerRead)?;
        let active = FiscalRepository::find_active(self.ctx.db.connection()).await;
        finish(
            "fiscal.active",
            active
                .map_err(AppError::from)
                .and_then(|year| Ok(year.ok_or(FiscalError::NoActiveFiscalYear)?)),
        )
    }
}
