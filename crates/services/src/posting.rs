//! Journal booking and reversal inside a unit of work.
//!
//! Both paths pass the fiscal gate and the account checks before writing
//! anything, allocate the journal number from the fiscal year's sequence,
//! and insert the posted entry.

use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use tally_core::fiscal::{FiscalError, PostingPeriod, resolve_posting_period};
use tally_core::ledger::{Account, JournalEntry, LedgerError, PostingPlan};
use tally_db::{
    AccountRepository, DatabaseTransaction, FiscalRepository, JournalRepository,
    SequenceRepository,
};
use tally_shared::AppResult;
use tally_shared::types::{AccountId, JournalEntryId};
use tracing::debug;

use crate::context::ServiceContext;

/// Resolves the open period of the active year that contains `date`.
pub(crate) async fn resolve_period<C: ConnectionTrait>(
    db: &C,
    date: NaiveDate,
) -> AppResult<PostingPeriod> {
    let year = FiscalRepository::find_active(db)
        .await?
        .ok_or(FiscalError::NoActiveFiscalYear)?;
    Ok(resolve_posting_period(&year, date)?)
}

/// An account that exists and accepts journal lines.
pub(crate) async fn postable_account<C: ConnectionTrait>(
    db: &C,
    id: AccountId,
) -> AppResult<Account> {
    let account = AccountRepository::find_by_id(db, id)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;
    account.ensure_postable()?;
    Ok(account)
}

/// Same as [`postable_account`], looked up by code.
pub(crate) async fn postable_account_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> AppResult<Account> {
    let account = AccountRepository::find_by_code(db, code)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
    account.ensure_postable()?;
    Ok(account)
}

/// Fails unless every account in the plan accepts postings.
pub(crate) async fn check_plan_accounts<C: ConnectionTrait>(
    db: &C,
    plan: &PostingPlan,
) -> AppResult<()> {
    for line in &plan.lines {
        postable_account(db, line.account_id).await?;
    }
    Ok(())
}

/// A stored entry, or `NotFound`.
pub(crate) async fn load_entry<C: ConnectionTrait>(
    db: &C,
    id: JournalEntryId,
) -> AppResult<JournalEntry> {
    Ok(JournalRepository::find_with_lines(db, id)
        .await?
        .ok_or(LedgerError::EntryNotFound(id))?)
}

/// Builds, posts and stores the entry for `plan` inside `period`.
pub(crate) async fn book(
    txn: &DatabaseTransaction,
    ctx: &ServiceContext,
    plan: PostingPlan,
    period: &PostingPeriod,
    posted_by: &str,
) -> AppResult<JournalEntryId> {
    let now = ctx.clock.now();
    let mut entry = plan.into_draft(period, now)?;
    let number = next_journal_number(txn, ctx, period).await?;
    entry.post(&number, posted_by, now)?;

    let id = entry.id;
    debug!(journal_number = %number, journal_id = %id, "Journal entry posted");
    JournalRepository::insert(txn, entry).await?;
    Ok(id)
}

/// Posts a stored draft inside `period` and saves it.
pub(crate) async fn post_draft(
    txn: &DatabaseTransaction,
    ctx: &ServiceContext,
    mut entry: JournalEntry,
    period: &PostingPeriod,
    posted_by: &str,
) -> AppResult<JournalEntry> {
    let number = next_journal_number(txn, ctx, period).await?;
    entry.post(&number, posted_by, ctx.clock.now())?;

    debug!(journal_number = %number, journal_id = %entry.id, "Draft journal entry posted");
    JournalRepository::update(txn, entry.clone()).await?;
    Ok(entry)
}

/// Posts the mirror of `original_id`, dated today, and marks the original.
pub(crate) async fn reverse(
    txn: &DatabaseTransaction,
    ctx: &ServiceContext,
    original_id: JournalEntryId,
    reason: &str,
    posted_by: &str,
) -> AppResult<JournalEntryId> {
    let mut original = load_entry(txn, original_id).await?;

    let today = ctx.clock.today();
    let now = ctx.clock.now();
    let period = resolve_period(txn, today).await?;

    let mut mirror = original.create_reversal(
        today,
        reason,
        period.fiscal_year_id,
        period.fiscal_period_id,
        now,
    )?;
    let number = next_journal_number(txn, ctx, &period).await?;
    mirror.post(&number, posted_by, now)?;
    original.mark_as_reversed(mirror.id)?;

    let mirror_id = mirror.id;
    debug!(journal_number = %number, reverses = %original_id, "Reversal entry posted");
    JournalRepository::insert(txn, mirror).await?;
    JournalRepository::update(txn, original).await?;
    Ok(mirror_id)
}

async fn next_journal_number(
    txn: &DatabaseTransaction,
    ctx: &ServiceContext,
    period: &PostingPeriod,
) -> AppResult<String> {
    Ok(SequenceRepository::next_journal_number(
        txn,
        period.fiscal_year_id,
        &ctx.config.posting.journal_prefix,
        ctx.config.posting.journal_width,
    )
    .await?)
}
