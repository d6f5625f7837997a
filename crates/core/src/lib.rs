//! Core posting rules for Tally.
//!
//! This crate contains pure business logic with ZERO store or async dependencies.
//! All domain types, validation rules, and state machines live here.
//!
//! # Modules
//!
//! - `ledger` - Accounts, journal entries, reversal and balances
//! - `fiscal` - Fiscal years, periods and the posting gate
//! - `treasury` - Cashboxes and cash payment/receipt/transfer vouchers
//! - `inventory` - Stock levels, movements and inventory adjustments
//! - `settlement` - Invoice paid/balance-due tracking
//! - `numbering` - Human-readable document and journal numbers
//! - `document` - Lifecycle shared by every transaction document

pub mod document;
pub mod fiscal;
pub mod inventory;
pub mod ledger;
pub mod numbering;
pub mod settlement;
pub mod treasury;
