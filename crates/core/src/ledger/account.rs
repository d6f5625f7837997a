//! Chart of accounts entries as seen by the posting engine.

use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::error::LedgerError;

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Chart code (e.g. "1131").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Inactive accounts accept no new postings.
    pub is_active: bool,
    /// Only leaf accounts carry lines; parents are roll-ups.
    pub is_leaf: bool,
    /// Leaf accounts can still be closed to direct posting.
    pub allow_posting: bool,
}

impl Account {
    /// Creates an active, postable leaf account.
    #[must_use]
    pub fn leaf(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            code: code.into(),
            name: name.into(),
            is_active: true,
            is_leaf: true,
            allow_posting: true,
        }
    }

    /// Creates a parent (roll-up) account.
    #[must_use]
    pub fn parent(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_leaf: false,
            allow_posting: false,
            ..Self::leaf(code, name)
        }
    }

    /// Returns true if journal lines may be booked against this account.
    #[must_use]
    pub fn can_receive_postings(&self) -> bool {
        self.is_active && self.is_leaf && self.allow_posting
    }

    /// Returns `AccountNotPostable` unless the account can receive postings.
    pub fn ensure_postable(&self) -> Result<(), LedgerError> {
        if self.can_receive_postings() {
            Ok(())
        } else {
            Err(LedgerError::AccountNotPostable {
                account_id: self.id,
                code: self.code.clone(),
            })
        }
    }
}
