//! Cashboxes and their ledger link.
//!
//! A cashbox has no stored balance. Its balance is the debit-minus-credit
//! total of posted journal lines on its ledger account.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CashboxId};

use super::error::TreasuryError;

/// A physical or virtual till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cashbox {
    /// Unique identifier.
    pub id: CashboxId,
    /// Short code, e.g. `MAIN`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Ledger account that carries the balance.
    pub account_id: Option<AccountId>,
    /// Inactive cashboxes take no new postings.
    pub is_active: bool,
}

impl Cashbox {
    /// Creates an active cashbox linked to `account_id`.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_id: AccountId) -> Self {
        Self {
            id: CashboxId::new(),
            code: code.into(),
            name: name.into(),
            account_id: Some(account_id),
            is_active: true,
        }
    }

    /// Ledger account to post against.
    ///
    /// # Errors
    ///
    /// - `CashboxInactive` if the cashbox was deactivated
    /// - `CashboxWithoutAccount` if no ledger account is linked
    pub fn posting_account(&self) -> Result<AccountId, TreasuryError> {
        if !self.is_active {
            return Err(TreasuryError::CashboxInactive {
                code: self.code.clone(),
            });
        }
        self.account_id
            .ok_or_else(|| TreasuryError::CashboxWithoutAccount {
                code: self.code.clone(),
            })
    }

    /// Fails unless `available` covers `required`.
    pub fn ensure_covers(&self, available: Decimal, required: Decimal) -> Result<(), TreasuryError> {
        if available < required {
            return Err(TreasuryError::InsufficientCashboxBalance {
                code: self.code.clone(),
                available,
                required,
            });
        }
        Ok(())
    }

    /// Memo used on journal lines against this cashbox.
    #[must_use]
    pub fn memo(&self) -> String {
        format!("Cashbox {}", self.code)
    }
}
