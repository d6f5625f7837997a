//! Manual journal entries and journal queries.
//!
//! Every write passes the fiscal gate for the entry's date inside its unit
//! of work, so a draft can't be created, edited, posted or deleted once its
//! period is closed. Reversals are dated today and gated on today's period.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::fiscal::PostingPeriod;
use tally_core::ledger::{
    AccountBalance, JournalEntry, JournalStatus, LedgerError, NewJournalEntry, SourceType,
};
use tally_db::{Database, DatabaseTransaction, JournalRepository};
use tally_shared::types::{AccountId, JournalEntryId};
use tally_shared::{AppError, AppResult};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::{CurrentUser, Permission};
use crate::context::{ServiceContext, finish};
use crate::posting;
use crate::registry::{ModuleService, SystemModule};

/// One line of a manual entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Account to post against.
    pub account_id: AccountId,
    /// Debit amount, zero on a credit line.
    pub debit: Decimal,
    /// Credit amount, zero on a debit line.
    pub credit: Decimal,
    /// Line memo.
    pub memo: Option<String>,
}

/// Create input for a manual entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualJournalInput {
    /// Accounting date; picks the fiscal period.
    pub journal_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Optional human-readable reference.
    pub reference_number: Option<String>,
    /// Initial lines. May be empty.
    pub lines: Vec<JournalLineInput>,
}

/// Manual journal workflow and read access to the ledger.
#[derive(Debug, Clone)]
pub struct JournalService {
    ctx: ServiceContext,
}

impl ModuleService for JournalService {
    const MODULE: SystemModule = SystemModule::Ledger;
    const NAME: &'static str = "JournalService";
}

/// Appends `line` after checking its account.
async fn push_line(
    txn: &DatabaseTransaction,
    ctx: &ServiceContext,
    entry: &mut JournalEntry,
    line: JournalLineInput,
) -> AppResult<u32> {
    posting::postable_account(txn, line.account_id).await?;
    Ok(entry.add_line(line.account_id, line.debit, line.credit, ctx.clock.now(), line.memo)?)
}

/// Loads a draft together with the open period of its date.
async fn load_draft(
    txn: &DatabaseTransaction,
    id: JournalEntryId,
) -> AppResult<(JournalEntry, PostingPeriod)> {
    let entry = posting::load_entry(txn, id).await?;
    let status = entry.status();
    if status != JournalStatus::Draft {
        return Err(LedgerError::NotDraft { status }.into());
    }
    let period = posting::resolve_period(txn, entry.journal_date).await?;
    Ok((entry, period))
}

impl JournalService {
    /// Creates the service.
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Creates a manual draft in the open period of its date.
    #[instrument(skip_all, fields(user = %user.username, date = %input.journal_date))]
    pub async fn create_draft(
        &self,
        user: &CurrentUser,
        input: ManualJournalInput,
    ) -> AppResult<JournalEntry> {
        user.require(Permission::LedgerWrite)?;

        let result: AppResult<JournalEntry> = async {
            let txn = self.ctx.db.begin().await?;
            let period = posting::resolve_period(&txn, input.journal_date).await?;
            let mut entry = JournalEntry::create_draft(NewJournalEntry {
                journal_date: input.journal_date,
                description: input.description,
                source_type: SourceType::Manual,
                fiscal_year_id: period.fiscal_year_id,
                fiscal_period_id: period.fiscal_period_id,
                reference_number: input.reference_number,
                source_id: None,
            })?;
            for line in input.lines {
                push_line(&txn, &self.ctx, &mut entry, line).await?;
            }
            JournalRepository::insert(&txn, entry.clone()).await?;
            Database::commit(txn).await?;
            Ok(entry)
        }
        .await;
        let entry = finish("journal.create_draft", result)?;

        info!(draft_code = %entry.draft_code, lines = entry.lines().len(), "Journal draft created");
        Ok(entry)
    }

    /// Appends a line to a draft.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn add_line(
        &self,
        user: &CurrentUser,
        id: JournalEntryId,
        line: JournalLineInput,
    ) -> AppResult<JournalEntry> {
        user.require(Permission::LedgerWrite)?;

        let result: AppResult<JournalEntry> = async {
            let txn = self.ctx.db.begin().await?;
            let (mut entry, _) = load_draft(&txn, id).await?;
            push_line(&txn, &self.ctx, &mut entry, line).await?;
            JournalRepository::update(&txn, entry.clone()).await?;
            Database::commit(txn).await?;
            Ok(entry)
        }
        .await;
        finish("journal.add_line", result)
    }

    /// Numbers and posts a balanced draft.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn post(&self, user: &CurrentUser, id: JournalEntryId) -> AppResult<JournalEntry> {
        user.require(Permission::LedgerPost)?;

        let result: AppResult<JournalEntry> = async {
            let txn = self.ctx.db.begin().await?;
            let (mut entry, period) = load_draft(&txn, id).await?;
            for line in entry.lines() {
                posting::postable_account(&txn, line.account_id).await?;
            }
            entry.fiscal_year_id = period.fiscal_year_id;
            entry.fiscal_period_id = period.fiscal_period_id;

            let posted =
                posting::post_draft(&txn, &self.ctx, entry, &period, &user.username).await?;
            Database::commit(txn).await?;
            Ok(posted)
        }
        .await;
        let entry = finish("journal.post", result)?;

        info!(
            journal_number = ?entry.journal_number,
            total = %entry.total_debit(),
            "Manual journal entry posted"
        );
        Ok(entry)
    }

    /// Posts the mirror of a posted entry, dated today. Returns the mirror.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn reverse(
        &self,
        user: &CurrentUser,
        id: JournalEntryId,
        reason: &str,
    ) -> AppResult<JournalEntry> {
        user.require(Permission::LedgerPost)?;

        let result: AppResult<JournalEntry> = async {
            let txn = self.ctx.db.begin().await?;
            let mirror_id = posting::reverse(&txn, &self.ctx, id, reason, &user.username).await?;
            let mirror = posting::load_entry(&txn, mirror_id).await?;
            Database::commit(txn).await?;
            Ok(mirror)
        }
        .await;
        let mirror = finish("journal.reverse", result)?;

        info!(
            journal_number = ?mirror.journal_number,
            reverses = %id,
            "Journal entry reversed"
        );
        Ok(mirror)
    }

    /// Removes a draft that was never posted.
    #[instrument(skip_all, fields(user = %user.username, id = %id))]
    pub async fn delete_draft(&self, user: &CurrentUser, id: JournalEntryId) -> AppResult<()> {
        user.require(Permission::LedgerWrite)?;

        let result: AppResult<String> = async {
            let txn = self.ctx.db.begin().await?;
            let (entry, _) = load_draft(&txn, id).await?;
            JournalRepository::delete(&txn, id).await?;
            Database::commit(txn).await?;
            Ok(entry.draft_code)
        }
        .await;
        let draft_code = finish("journal.delete_draft", result)?;

        info!(draft_code = %draft_code, "Journal draft deleted");
        Ok(())
    }

    /// An entry with its lines.
    pub async fn get(&self, user: &CurrentUser, id: JournalEntryId) -> AppResult<JournalEntry> {
        user.require(Permission::LedgerRead)?;
        finish("journal.get", posting::load_entry(self.ctx.db.connection(), id).await)
    }

    /// Entries booked for a document, original first.
    pub async fn for_source(&self, user: &CurrentUser, source_id: Uuid) -> AppResult<Vec<JournalEntry>> {
        user.require(Permission::LedgerRead)?;
        let entries = JournalRepository::find_by_source(self.ctx.db.connection(), source_id).await;
        finish("journal.for_source", entries.map_err(AppError::from))
    }

    /// Debit and credit totals of posted lines on an account.
    pub async fn account_balance(
        &self,
        user: &CurrentUser,
        account_id: AccountId,
    ) -> AppResult<AccountBalance> {
        user.require(Permission::LedgerRead)?;
        let balance = JournalRepository::account_balance(self.ctx.db.connection(), account_id).await;
        finish("journal.account_balance", balance.map_err(AppError::from))
    }
}
