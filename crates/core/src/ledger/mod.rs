//! Double-entry bookkeeping.
//!
//! - Accounts and their posting eligibility
//! - Journal entries (draft, post)
//! - Posting plans built by documents
//! - Reversal of posted entries
//! - Balances derived from posted lines

pub mod account;
pub mod balance;
pub mod error;
pub mod journal;
pub mod posting;
pub mod reversal;

#[cfg(test)]
mod journal_props;

pub use account::Account;
pub use balance::AccountBalance;
pub use error::LedgerError;
pub use journal::{
    JournalEntry, JournalEntryRecord, JournalLine, JournalStatus, NewJournalEntry, SourceType,
};
pub use posting::{PlannedLine, PostingPlan};
pub use reversal::REVERSAL_PREFIX;
