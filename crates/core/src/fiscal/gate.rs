//! The posting gate.
//!
//! Every post and every reversal resolves its period here before touching
//! any balance. Checks run in a fixed order: active year, date inside the
//! year, period for the month, period open.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tally_shared::types::{FiscalPeriodId, FiscalYearId};

use super::error::FiscalError;
use super::period::{FiscalPeriod, FiscalYear};

/// The year and period a journal entry books into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingPeriod {
    /// Active fiscal year.
    pub fiscal_year_id: FiscalYearId,
    /// Open period containing the date.
    pub fiscal_period_id: FiscalPeriodId,
    /// Calendar year.
    pub year: i32,
    /// Month (1-12).
    pub month: u32,
}

/// Picks the single active year.
pub fn active_year<'a, I>(years: I) -> Result<&'a FiscalYear, FiscalError>
where
    I: IntoIterator<Item = &'a FiscalYear>,
{
    years
        .into_iter()
        .find(|y| y.is_active())
        .ok_or(FiscalError::NoActiveFiscalYear)
}

/// Finds the period of `year` that contains `date`, open or not.
pub fn period_for_date(year: &FiscalYear, date: NaiveDate) -> Result<&FiscalPeriod, FiscalError> {
    if !year.contains_date(date) {
        return Err(FiscalError::DateOutsideFiscalYear {
            date,
            year: year.year,
        });
    }
    year.period_for_month(date.month())?
        .ok_or(FiscalError::PeriodNotFound {
            year: year.year,
            month: date.month(),
        })
}

/// Resolves the open period for `date` in an active year.
///
/// # Errors
///
/// - `NoActiveFiscalYear` if `year` is not active
/// - `DateOutsideFiscalYear` if the date falls outside the year
/// - `PeriodNotFound` if the year has no period for the month
/// - `PeriodClosed` if the period is closed
pub fn resolve_posting_period(
    year: &FiscalYear,
    date: NaiveDate,
) -> Result<PostingPeriod, FiscalError> {
    if !year.is_active() {
        return Err(FiscalError::NoActiveFiscalYear);
    }
    let period = period_for_date(year, date)?;
    if !period.is_open() {
        return Err(FiscalError::PeriodClosed {
            year: period.year,
            month: period.month,
        });
    }
    Ok(PostingPeriod {
        fiscal_year_id: year.id,
        fiscal_period_id: period.id,
        year: period.year,
        month: period.month,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn active(year: i32) -> FiscalYear {
        let mut fy = FiscalYear::new(year).unwrap();
        fy.activate().unwrap();
        fy
    }

    #[test]
    fn test_active_year() {
        let setup = FiscalYear::new(2025).unwrap();
        let current = active(2026);

        assert_eq!(active_year([&setup, &current]).unwrap().year, 2026);
        assert_eq!(
            active_year([&setup]).unwrap_err(),
            FiscalError::NoActiveFiscalYear
        );
    }

    #[test]
    fn test_resolve_open_period() {
        let year = active(2026);
        let period = resolve_posting_period(&year, date(2026, 3, 15)).unwrap();

        assert_eq!(period.fiscal_year_id, year.id);
        assert_eq!(period.month, 3);
        assert_eq!(period.fiscal_period_id, year.periods[2].id);
    }

    #[test]
    fn test_resolve_rejects_inactive_year() {
        let year = FiscalYear::new(2026).unwrap();
        assert_eq!(
            resolve_posting_period(&year, date(2026, 3, 15)),
            Err(FiscalError::NoActiveFiscalYear)
        );
    }

    #[test]
    fn test_resolve_rejects_date_outside_year() {
        let year = active(2026);
        assert_eq!(
            resolve_posting_period(&year, date(2025, 3, 15)),
            Err(FiscalError::DateOutsideFiscalYear {
                date: date(2025, 3, 15),
                year: 2026
            })
        );
    }

    #[test]
    fn test_resolve_rejects_missing_period() {
        let mut year = active(2026);
        year.periods.retain(|p| p.month != 5);
        assert_eq!(
            resolve_posting_period(&year, date(2026, 5, 2)),
            Err(FiscalError::PeriodNotFound {
                year: 2026,
                month: 5
            })
        );
    }

    #[test]
    fn test_resolve_rejects_closed_period() {
        let mut year = active(2026);
        year.close_period(3, "controller", Utc::now()).unwrap();

        assert_eq!(
            resolve_posting_period(&year, date(2026, 3, 31)),
            Err(FiscalError::PeriodClosed {
                year: 2026,
                month: 3
            })
        );
        assert!(resolve_posting_period(&year, date(2026, 4, 1)).is_ok());
    }
}
