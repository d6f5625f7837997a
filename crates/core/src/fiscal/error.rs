//! Fiscal calendar errors.

use chrono::NaiveDate;
use tally_shared::AppError;
use tally_shared::types::FiscalYearId;
use thiserror::Error;

use super::period::{FiscalYearStatus, PeriodStatus};

/// Errors raised by the fiscal calendar and the posting gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FiscalError {
    /// Fiscal year lookup failed.
    #[error("Fiscal year not found: {0}")]
    YearNotFound(FiscalYearId),

    /// No fiscal year is currently active.
    #[error("No active fiscal year")]
    NoActiveFiscalYear,

    /// Date is not inside the active fiscal year.
    #[error("Date {date} is outside fiscal year {year}")]
    DateOutsideFiscalYear {
        /// The document or reversal date.
        date: NaiveDate,
        /// The active fiscal year.
        year: i32,
    },

    /// The year has no period for the month.
    #[error("No fiscal period for {year}-{month:02}")]
    PeriodNotFound {
        /// Calendar year.
        year: i32,
        /// Month (1-12).
        month: u32,
    },

    /// The period exists but is closed.
    #[error("Fiscal period {year}-{month:02} is closed")]
    PeriodClosed {
        /// Calendar year.
        year: i32,
        /// Month (1-12).
        month: u32,
    },

    /// Year outside the supported range.
    #[error("Fiscal year must be between 2000 and 2100, got {0}")]
    InvalidYear(i32),

    /// Month outside 1-12.
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    /// Fiscal year is in the wrong status for the operation.
    #[error("Fiscal year is {status}; operation not allowed")]
    InvalidYearStatus {
        /// Current status.
        status: FiscalYearStatus,
    },

    /// Period is already in the requested status.
    #[error("Fiscal period is already {status}")]
    PeriodAlreadyInStatus {
        /// Current status.
        status: PeriodStatus,
    },

    /// Year cannot close while periods are open.
    #[error("All periods must be closed before closing the fiscal year")]
    OpenPeriodsRemain,

    /// User or reason missing on an audited change.
    #[error("{0} is required")]
    AuditFieldRequired(&'static str),

    /// Another year is already active.
    #[error("Fiscal year {0} is already active")]
    AnotherYearActive(i32),
}

impl FiscalError {
    /// Returns the error code for logs and API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::YearNotFound(_) => "FISCAL_YEAR_NOT_FOUND",
            Self::NoActiveFiscalYear => "NO_ACTIVE_FISCAL_YEAR",
            Self::DateOutsideFiscalYear { .. } => "DATE_OUTSIDE_FISCAL_YEAR",
            Self::PeriodNotFound { .. } => "PERIOD_NOT_FOUND",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::InvalidYear(_) => "INVALID_YEAR",
            Self::InvalidMonth(_) => "INVALID_MONTH",
            Self::InvalidYearStatus { .. } => "INVALID_YEAR_STATUS",
            Self::PeriodAlreadyInStatus { .. } => "PERIOD_ALREADY_IN_STATUS",
            Self::OpenPeriodsRemain => "OPEN_PERIODS_REMAIN",
            Self::AuditFieldRequired(_) => "AUDIT_FIELD_REQUIRED",
            Self::AnotherYearActive(_) => "ANOTHER_YEAR_ACTIVE",
        }
    }
}

impl From<FiscalError> for AppError {
    fn from(err: FiscalError) -> Self {
        let message = err.to_string();
        match err {
            FiscalError::YearNotFound(_)
            | FiscalError::NoActiveFiscalYear
            | FiscalError::PeriodNotFound { .. } => Self::NotFound(message),
            FiscalError::InvalidYear(_)
            | FiscalError::InvalidMonth(_)
            | FiscalError::AuditFieldRequired(_) => Self::Validation(message),
            FiscalError::InvalidYearStatus { .. }
            | FiscalError::PeriodAlreadyInStatus { .. }
            | FiscalError::AnotherYearActive(_) => Self::StateConflict(message),
            FiscalError::DateOutsideFiscalYear { .. }
            | FiscalError::PeriodClosed { .. }
            | FiscalError::OpenPeriodsRemain => Self::InvariantViolation(message),
        }
    }
}
