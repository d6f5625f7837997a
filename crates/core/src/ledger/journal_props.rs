//! Property-based tests for journal posting and reversal.
//!
//! - Balanced line sets always post and keep debits equal to credits
//! - Unbalanced line sets never post and leave the entry in Draft
//! - A posted mirror nets every account to zero against its original

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, FiscalPeriodId, FiscalYearId};
use uuid::Uuid;

use crate::ledger::error::LedgerError;
use crate::ledger::journal::{JournalEntry, JournalStatus, NewJournalEntry, SourceType};

/// Strategy for generating random account IDs.
fn arb_account() -> impl Strategy<Value = AccountId> {
    any::<u128>().prop_map(|n| AccountId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating positive two-decimal amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Debit/credit pairs with equal amounts: (debit account, credit account, amount).
fn arb_balanced_pairs() -> impl Strategy<Value = Vec<(AccountId, AccountId, Decimal)>> {
    prop::collection::vec((arb_account(), arb_account(), arb_amount()), 1..6)
}

fn new_draft() -> JournalEntry {
    JournalEntry::create_draft(NewJournalEntry {
        journal_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        description: "Generated entry".to_string(),
        source_type: SourceType::Manual,
        fiscal_year_id: FiscalYearId::new(),
        fiscal_period_id: FiscalPeriodId::new(),
        reference_number: None,
        source_id: None,
    })
    .unwrap()
}

fn build(pairs: &[(AccountId, AccountId, Decimal)]) -> JournalEntry {
    let now = Utc::now();
    let mut entry = new_draft();
    for (debit_account, credit_account, amount) in pairs {
        entry
            .add_line(*debit_account, *amount, Decimal::ZERO, now, None)
            .unwrap();
        entry
            .add_line(*credit_account, Decimal::ZERO, *amount, now, None)
            .unwrap();
    }
    entry
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_balanced_sets_post(pairs in arb_balanced_pairs()) {
        let mut entry = build(&pairs);

        prop_assert!(entry.post("JV-000001", "prop", Utc::now()).is_ok());
        prop_assert_eq!(entry.status(), JournalStatus::Posted);
        prop_assert_eq!(entry.total_debit(), entry.total_credit());
    }

    #[test]
    fn prop_unbalanced_sets_stay_draft(
        pairs in arb_balanced_pairs(),
        account in arb_account(),
        extra in arb_amount(),
    ) {
        let mut entry = build(&pairs);
        entry.add_line(account, extra, Decimal::ZERO, Utc::now(), None).unwrap();

        let result = entry.post("JV-000001", "prop", Utc::now());

        let is_unbalanced = matches!(result, Err(LedgerError::UnbalancedEntry { .. }));
        prop_assert!(is_unbalanced);
        prop_assert_eq!(entry.status(), JournalStatus::Draft);
        prop_assert!(entry.journal_number.is_none());
    }

    #[test]
    fn prop_mirror_nets_to_zero(pairs in arb_balanced_pairs()) {
        let mut original = build(&pairs);
        original.post("JV-000001", "prop", Utc::now()).unwrap();

        let mut mirror = original
            .create_reversal(
                NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                "prop reversal",
                FiscalYearId::new(),
                FiscalPeriodId::new(),
                Utc::now(),
            )
            .unwrap();
        prop_assert!(mirror.post("JV-000002", "prop", Utc::now()).is_ok());
        prop_assert!(original.mark_as_reversed(mirror.id).is_ok());

        for (debit_account, credit_account, _) in &pairs {
            for account in [debit_account, credit_account] {
                let net: Decimal = original
                    .lines()
                    .iter()
                    .chain(mirror.lines())
                    .filter(|l| l.account_id == *account)
                    .map(|l| l.debit - l.credit)
                    .sum();
                prop_assert_eq!(net, Decimal::ZERO);
            }
        }

        let second = original.create_reversal(
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            "again",
            FiscalYearId::new(),
            FiscalPeriodId::new(),
            Utc::now(),
        );
        let already_reversed = matches!(second, Err(LedgerError::AlreadyReversed { .. }));
        prop_assert!(already_reversed);
    }
}
