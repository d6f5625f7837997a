//! Manual journal entries: draft, post, reverse and delete.

mod common;

use common::{TestLedger, date, today};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::ledger::{JournalStatus, SourceType};
use tally_services::journal::{JournalLineInput, ManualJournalInput};
use tally_services::{CurrentUser, UserRole};
use tally_shared::AppError;
use tally_shared::types::AccountId;

fn line(account_id: AccountId, debit: Decimal, credit: Decimal) -> JournalLineInput {
    JournalLineInput {
        account_id,
        debit,
        credit,
        memo: None,
    }
}

fn opening_entry(ledger: &TestLedger, amount: Decimal) -> ManualJournalInput {
    ManualJournalInput {
        journal_date: today(),
        description: "Opening capital".to_string(),
        reference_number: Some("OB-1".to_string()),
        lines: vec![
            line(ledger.chart.main_cash, amount, Decimal::ZERO),
            line(ledger.chart.capital, Decimal::ZERO, amount),
        ],
    }
}

#[tokio::test]
async fn test_draft_then_post_updates_balances() {
    let ledger = TestLedger::new().await;
    let draft = ledger
        .services
        .journal
        .create_draft(&ledger.admin, opening_entry(&ledger, dec!(500.00)))
        .await
        .unwrap();
    assert_eq!(draft.status(), JournalStatus::Draft);
    assert_eq!(draft.source_type, SourceType::Manual);
    assert_eq!(ledger.account_balance(ledger.chart.main_cash).await, Decimal::ZERO);

    let posted = ledger.services.journal.post(&ledger.admin, draft.id).await.unwrap();

    assert_eq!(posted.status(), JournalStatus::Posted);
    assert_eq!(posted.journal_number.as_deref(), Some("JV-000001"));
    assert_eq!(posted.posted_by.as_deref(), Some("alice"));
    assert_eq!(ledger.cash_balance(&ledger.main).await, dec!(500.00));
}

#[tokio::test]
async fn test_lines_added_one_at_a_time() {
    let ledger = TestLedger::new().await;
    let mut input = opening_entry(&ledger, dec!(80.00));
    input.lines.clear();
    let draft = ledger.services.journal.create_draft(&ledger.admin, input).await.unwrap();

    let journal = &ledger.services.journal;
    journal
        .add_line(&ledger.admin, draft.id, line(ledger.chart.main_cash, dec!(80.00), Decimal::ZERO))
        .await
        .unwrap();
    let err = journal.post(&ledger.admin, draft.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvariantViolation(_)));

    let draft = journal
        .add_line(&ledger.admin, draft.id, line(ledger.chart.capital, Decimal::ZERO, dec!(80.00)))
        .await
        .unwrap();
    assert_eq!(draft.lines().len(), 2);
    assert_eq!(draft.lines()[1].line_number, 2);

    journal.post(&ledger.admin, draft.id).await.unwrap();
    assert_eq!(ledger.account_balance(ledger.chart.main_cash).await, dec!(80.00));
}

#[tokio::test]
async fn test_parent_account_line_rejected() {
    let ledger = TestLedger::new().await;
    let mut input = opening_entry(&ledger, dec!(10.00));
    input.lines[0].account_id = ledger.chart.assets;

    let err = ledger.services.journal.create_draft(&ledger.admin, input).await.unwrap_err();

    assert!(matches!(err, AppError::InvariantViolation(_)));
    assert_eq!(ledger.journal_count().await, 0);
}

#[tokio::test]
async fn test_second_reverse_is_a_state_conflict() {
    let ledger = TestLedger::new().await;
    let journal = &ledger.services.journal;
    let draft = journal
        .create_draft(&ledger.admin, opening_entry(&ledger, dec!(300.00)))
        .await
        .unwrap();
    let posted = journal.post(&ledger.admin, draft.id).await.unwrap();

    let mirror = journal.reverse(&ledger.admin, posted.id, "Entered twice").await.unwrap();
    assert_eq!(mirror.reversed_entry_id, Some(posted.id));
    assert_eq!(mirror.journal_date, today());
    assert_eq!(ledger.cash_balance(&ledger.main).await, Decimal::ZERO);

    let err = journal.reverse(&ledger.admin, posted.id, "Entered twice").await.unwrap_err();

    assert!(matches!(err, AppError::StateConflict(_)));
    assert_eq!(ledger.journal_count().await, 2);
    assert_eq!(ledger.cash_balance(&ledger.main).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_draft_cannot_be_reversed() {
    let ledger = TestLedger::new().await;
    let draft = ledger
        .services
        .journal
        .create_draft(&ledger.admin, opening_entry(&ledger, dec!(20.00)))
        .await
        .unwrap();

    let err = ledger
        .services
        .journal
        .reverse(&ledger.admin, draft.id, "Wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::StateConflict(_)));
}

#[tokio::test]
async fn test_delete_draft_only_before_posting() {
    let ledger = TestLedger::new().await;
    let journal = &ledger.services.journal;
    let keep = journal
        .create_draft(&ledger.admin, opening_entry(&ledger, dec!(5.00)))
        .await
        .unwrap();
    let drop = journal
        .create_draft(&ledger.admin, opening_entry(&ledger, dec!(6.00)))
        .await
        .unwrap();

    journal.delete_draft(&ledger.admin, drop.id).await.unwrap();
    let err = journal.get(&ledger.admin, drop.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    journal.post(&ledger.admin, keep.id).await.unwrap();
    let err = journal.delete_draft(&ledger.admin, keep.id).await.unwrap_err();
    assert!(matches!(err, AppError::StateConflict(_)));
    assert_eq!(ledger.journal_count().await, 1);
}

#[tokio::test]
async fn test_closed_period_blocks_every_draft_change() {
    let ledger = TestLedger::new().await;
    let journal = &ledger.services.journal;
    let mut input = opening_entry(&ledger, dec!(40.00));
    input.journal_date = date(2026, 2, 10);
    let draft = journal.create_draft(&ledger.admin, input.clone()).await.unwrap();

    ledger
        .services
        .fiscal
        .close_period(&ledger.admin, ledger.year.id, 2)
        .await
        .unwrap();

    let closed = AppError::InvariantViolation("Fiscal period 2026-02 is closed".to_string());
    assert_eq!(journal.create_draft(&ledger.admin, input).await.unwrap_err(), closed);
    assert_eq!(
        journal
            .add_line(&ledger.admin, draft.id, line(ledger.chart.safe_cash, dec!(1.00), Decimal::ZERO))
            .await
            .unwrap_err(),
        closed
    );
    assert_eq!(journal.post(&ledger.admin, draft.id).await.unwrap_err(), closed);
    assert_eq!(journal.delete_draft(&ledger.admin, draft.id).await.unwrap_err(), closed);

    let unchanged = journal.get(&ledger.admin, draft.id).await.unwrap();
    assert_eq!(unchanged.status(), JournalStatus::Draft);
    assert_eq!(unchanged.lines().len(), 2);
}

#[tokio::test]
async fn test_manual_entries_need_ledger_permissions() {
    let ledger = TestLedger::new().await;
    let cashier = CurrentUser::new("carol", UserRole::Cashier);
    let accountant = CurrentUser::new("ann", UserRole::Accountant);
    let journal = &ledger.services.journal;

    let err = journal
        .create_draft(&cashier, opening_entry(&ledger, dec!(1.00)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let draft = journal
        .create_draft(&accountant, opening_entry(&ledger, dec!(1.00)))
        .await
        .unwrap();
    let err = journal.post(&cashier, draft.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let posted = journal.post(&accountant, draft.id).await.unwrap();
    assert_eq!(posted.posted_by.as_deref(), Some("ann"));
}
