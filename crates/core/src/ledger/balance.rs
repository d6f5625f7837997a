//! Account balances derived from posted journal lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::journal::JournalLine;

/// Running debit/credit totals for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
}

impl AccountBalance {
    /// A zero balance.
    #[must_use]
    pub fn zero(account_id: AccountId) -> Self {
        Self {
            account_id,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Sums the account's share of `lines`. Callers pass posted lines only.
    #[must_use]
    pub fn from_lines<'a, I>(account_id: AccountId, lines: I) -> Self
    where
        I: IntoIterator<Item = &'a JournalLine>,
    {
        lines
            .into_iter()
            .filter(|l| l.account_id == account_id)
            .fold(Self::zero(account_id), |mut acc, line| {
                acc.debit_total += line.debit;
                acc.credit_total += line.credit;
                acc
            })
    }

    /// Debit-normal balance (assets such as cash): debits minus credits.
    #[must_use]
    pub fn debit_balance(&self) -> Decimal {
        self.debit_total - self.credit_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::journal::{JournalEntry, NewJournalEntry, SourceType};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use tally_shared::types::{FiscalPeriodId, FiscalYearId};

    fn entry(debit_account: AccountId, credit_account: AccountId, amount: Decimal) -> JournalEntry {
        let now = Utc::now();
        let mut entry = JournalEntry::create_draft(NewJournalEntry {
            journal_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            description: "Opening cash".to_string(),
            source_type: SourceType::Opening,
            fiscal_year_id: FiscalYearId::new(),
            fiscal_period_id: FiscalPeriodId::new(),
            reference_number: None,
            source_id: None,
        })
        .unwrap();
        entry
            .add_line(debit_account, amount, Decimal::ZERO, now, None)
            .unwrap();
        entry
            .add_line(credit_account, Decimal::ZERO, amount, now, None)
            .unwrap();
        entry
    }

    #[test]
    fn test_balance_nets_both_sides() {
        let cash = AccountId::new();
        let equity = AccountId::new();

        let received = entry(cash, equity, dec!(300.00));
        let spent = entry(equity, cash, dec!(120.00));

        let balance = AccountBalance::from_lines(
            cash,
            received.lines().iter().chain(spent.lines()),
        );

        assert_eq!(balance.debit_total, dec!(300.00));
        assert_eq!(balance.credit_total, dec!(120.00));
        assert_eq!(balance.debit_balance(), dec!(180.00));
    }

    #[test]
    fn test_balance_of_unused_account_is_zero() {
        let balance = AccountBalance::from_lines(AccountId::new(), std::iter::empty::<&JournalLine>());
        assert_eq!(balance.debit_balance(), Decimal::ZERO);
    }
}
