//! Fiscal year and period types.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{FiscalPeriodId, FiscalYearId};

use super::error::FiscalError;

/// Lowest supported fiscal year.
pub const MIN_YEAR: i32 = 2000;
/// Highest supported fiscal year.
pub const MAX_YEAR: i32 = 2100;

/// Fiscal year status.
///
/// Setup → Active (activate) → Closed (close).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalYearStatus {
    /// Periods are being prepared; no posting yet.
    Setup,
    /// The year receives postings.
    Active,
    /// The year is permanently closed.
    Closed,
}

impl fmt::Display for FiscalYearStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Active => "active",
            Self::Closed => "closed",
        })
    }
}

/// Status of a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Period is open for postings.
    Open,
    /// Period is closed, no new postings allowed.
    Closed,
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

/// A monthly period within a fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Fiscal year this period belongs to.
    pub fiscal_year_id: FiscalYearId,
    /// Calendar year.
    pub year: i32,
    /// Month (1-12).
    pub month: u32,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
    /// Who closed the period.
    pub closed_by: Option<String>,
    /// When the period was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Why the period was last reopened.
    pub reopen_reason: Option<String>,
}

impl FiscalPeriod {
    /// Returns true if entries dated in this period can post.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// A fiscal year with its twelve monthly periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    /// Unique identifier.
    pub id: FiscalYearId,
    /// Calendar year.
    pub year: i32,
    /// January 1st.
    pub start_date: NaiveDate,
    /// December 31st.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: FiscalYearStatus,
    /// Who closed the year.
    pub closed_by: Option<String>,
    /// When the year was closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Periods ordered by month.
    pub periods: Vec<FiscalPeriod>,
}

impl FiscalYear {
    /// Creates a calendar fiscal year in Setup with twelve open periods.
    pub fn new(year: i32) -> Result<Self, FiscalError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(FiscalError::InvalidYear(year));
        }
        let start_date = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(FiscalError::InvalidYear(year))?;
        let end_date = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(FiscalError::InvalidYear(year))?;

        let id = FiscalYearId::new();
        let periods = (1..=12)
            .map(|month| -> Result<FiscalPeriod, FiscalError> {
                let start = NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or(FiscalError::InvalidMonth(month))?;
                let end = last_day_of_month(start).ok_or(FiscalError::InvalidMonth(month))?;
                Ok(FiscalPeriod {
                    id: FiscalPeriodId::new(),
                    fiscal_year_id: id,
                    year,
                    month,
                    start_date: start,
                    end_date: end,
                    status: PeriodStatus::Open,
                    closed_by: None,
                    closed_at: None,
                    reopen_reason: None,
                })
            })
            .collect::<Result<Vec<_>, FiscalError>>()?;

        Ok(Self {
            id,
            year,
            start_date,
            end_date,
            status: FiscalYearStatus::Setup,
            closed_by: None,
            closed_at: None,
            periods,
        })
    }

    /// Returns true while the year receives postings.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == FiscalYearStatus::Active
    }

    /// Returns true if the date falls inside the year.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Period for a month (1-12).
    pub fn period_for_month(&self, month: u32) -> Result<Option<&FiscalPeriod>, FiscalError> {
        if !(1..=12).contains(&month) {
            return Err(FiscalError::InvalidMonth(month));
        }
        Ok(self.periods.iter().find(|p| p.month == month))
    }

    /// Moves the year from Setup to Active.
    pub fn activate(&mut self) -> Result<(), FiscalError> {
        if self.status != FiscalYearStatus::Setup {
            return Err(FiscalError::InvalidYearStatus {
                status: self.status,
            });
        }
        if self.periods.len() != 12 {
            return Err(FiscalError::PeriodNotFound {
                year: self.year,
                month: u32::try_from(self.periods.len() + 1).unwrap_or(u32::MAX),
            });
        }
        self.status = FiscalYearStatus::Active;
        Ok(())
    }

    /// Closes one period to further posting.
    pub fn close_period(
        &mut self,
        month: u32,
        closed_by: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<&FiscalPeriod, FiscalError> {
        if self.status == FiscalYearStatus::Closed {
            return Err(FiscalError::InvalidYearStatus {
                status: self.status,
            });
        }
        let closed_by = closed_by.trim();
        if closed_by.is_empty() {
            return Err(FiscalError::AuditFieldRequired("Closing user"));
        }

        let period = self.period_mut(month)?;
        if period.status == PeriodStatus::Closed {
            return Err(FiscalError::PeriodAlreadyInStatus {
                status: PeriodStatus::Closed,
            });
        }
        period.status = PeriodStatus::Closed;
        period.closed_by = Some(closed_by.to_string());
        period.closed_at = Some(closed_at);
        Ok(period)
    }

    /// Reopens a closed period. A closed year cannot reopen periods.
    pub fn reopen_period(&mut self, month: u32, reason: &str) -> Result<&FiscalPeriod, FiscalError> {
        if self.status == FiscalYearStatus::Closed {
            return Err(FiscalError::InvalidYearStatus {
                status: self.status,
            });
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(FiscalError::AuditFieldRequired("Reopen reason"));
        }

        let period = self.period_mut(month)?;
        if period.status == PeriodStatus::Open {
            return Err(FiscalError::PeriodAlreadyInStatus {
                status: PeriodStatus::Open,
            });
        }
        period.status = PeriodStatus::Open;
        period.closed_by = None;
        period.closed_at = None;
        period.reopen_reason = Some(reason.to_string());
        Ok(period)
    }

    /// Closes an active year once every period is closed.
    pub fn close(&mut self, closed_by: &str, closed_at: DateTime<Utc>) -> Result<(), FiscalError> {
        if self.status != FiscalYearStatus::Active {
            return Err(FiscalError::InvalidYearStatus {
                status: self.status,
            });
        }
        let closed_by = closed_by.trim();
        if closed_by.is_empty() {
            return Err(FiscalError::AuditFieldRequired("Closing user"));
        }
        if self.periods.iter().any(FiscalPeriod::is_open) {
            return Err(FiscalError::OpenPeriodsRemain);
        }
        self.status = FiscalYearStatus::Closed;
        self.closed_by = Some(closed_by.to_string());
        self.closed_at = Some(closed_at);
        Ok(())
    }

    fn period_mut(&mut self, month: u32) -> Result<&mut FiscalPeriod, FiscalError> {
        if !(1..=12).contains(&month) {
            return Err(FiscalError::InvalidMonth(month));
        }
        let year = self.year;
        self.periods
            .iter_mut()
            .find(|p| p.month == month)
            .ok_or(FiscalError::PeriodNotFound { year, month })
    }
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_year_has_twelve_open_periods() {
        let year = FiscalYear::new(2024).unwrap();

        assert_eq!(year.status, FiscalYearStatus::Setup);
        assert_eq!(year.periods.len(), 12);
        assert!(year.periods.iter().all(FiscalPeriod::is_open));
        assert_eq!(year.periods[1].end_date, date(2024, 2, 29));
        assert_eq!(year.periods[11].end_date, date(2024, 12, 31));
        assert!(year.periods.iter().all(|p| p.fiscal_year_id == year.id));
    }

    #[test]
    fn test_new_year_range() {
        assert_eq!(FiscalYear::new(1999), Err(FiscalError::InvalidYear(1999)));
        assert_eq!(FiscalYear::new(2101), Err(FiscalError::InvalidYear(2101)));
    }

    #[test]
    fn test_activate_once() {
        let mut year = FiscalYear::new(2026).unwrap();
        year.activate().unwrap();
        assert!(year.is_active());
        assert_eq!(
            year.activate(),
            Err(FiscalError::InvalidYearStatus {
                status: FiscalYearStatus::Active
            })
        );
    }

    #[test]
    fn test_close_and_reopen_period() {
        let mut year = FiscalYear::new(2026).unwrap();
        year.activate().unwrap();

        let closed = year.close_period(3, "controller", Utc::now()).unwrap();
        assert!(!closed.is_open());
        assert_eq!(closed.closed_by.as_deref(), Some("controller"));

        assert_eq!(
            year.close_period(3, "controller", Utc::now()).unwrap_err(),
            FiscalError::PeriodAlreadyInStatus {
                status: PeriodStatus::Closed
            }
        );
        assert_eq!(
            year.reopen_period(3, " ").unwrap_err(),
            FiscalError::AuditFieldRequired("Reopen reason")
        );

        let reopened = year.reopen_period(3, "late supplier invoice").unwrap();
        assert!(reopened.is_open());
        assert_eq!(
            reopened.reopen_reason.as_deref(),
            Some("late supplier invoice")
        );
    }

    #[test]
    fn test_close_year_requires_closed_periods() {
        let mut year = FiscalYear::new(2026).unwrap();
        year.activate().unwrap();
        assert_eq!(
            year.close("controller", Utc::now()),
            Err(FiscalError::OpenPeriodsRemain)
        );

        for month in 1..=12 {
            year.close_period(month, "controller", Utc::now()).unwrap();
        }
        year.close("controller", Utc::now()).unwrap();
        assert_eq!(year.status, FiscalYearStatus::Closed);

        assert_eq!(
            year.reopen_period(1, "audit").unwrap_err(),
            FiscalError::InvalidYearStatus {
                status: FiscalYearStatus::Closed
            }
        );
    }

    #[test]
    fn test_period_for_month() {
        let year = FiscalYear::new(2026).unwrap();
        assert_eq!(year.period_for_month(7).unwrap().unwrap().month, 7);
        assert_eq!(year.period_for_month(0), Err(FiscalError::InvalidMonth(0)));
        assert!(year.contains_date(date(2026, 7, 31)));
        assert!(!year.contains_date(date(2027, 1, 1)));
    }
}
