//! Fiscal calendar and the posting gate.
//!
//! A fiscal year owns twelve monthly periods. Exactly one year is active at a
//! time and every post or reversal must land in one of its open periods.

pub mod error;
pub mod gate;
pub mod period;

pub use error::FiscalError;
pub use gate::{PostingPeriod, active_year, period_for_date, resolve_posting_period};
pub use period::{FiscalPeriod, FiscalYear, FiscalYearStatus, PeriodStatus};
