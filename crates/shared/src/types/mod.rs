//! Common types used across the application.

pub mod amount;
pub mod id;

pub use amount::{round_money, round_quantity};
pub use id::*;
