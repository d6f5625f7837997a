//! Fiscal year storage.
//!
//! Years are stored with their periods. At most one year may be active;
//! writes that would break this fail with [`StoreError::Constraint`].

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tally_core::fiscal::{FiscalPeriod, FiscalYear, FiscalYearStatus};
use tally_shared::types::{FiscalPeriodId, FiscalYearId};

use crate::columns::{signed, unsigned};
use crate::entities::{fiscal_periods, fiscal_years, sea_orm_active_enums};
use crate::error::StoreError;

/// Fiscal year repository.
#[derive(Debug, Clone, Copy)]
pub struct FiscalRepository;

impl FiscalRepository {
    /// Inserts a year with its periods.
    pub async fn insert<C: ConnectionTrait>(db: &C, year: FiscalYear) -> Result<(), StoreError> {
        if Self::find_by_year(db, year.year).await?.is_some() {
            return Err(StoreError::Duplicate(format!("fiscal year {}", year.year)));
        }
        Self::check_single_active(db, &year).await?;

        year_model(&year).insert(db).await?;
        for period in &year.periods {
            period_model(period)?.insert(db).await?;
        }
        Ok(())
    }

    /// Saves a changed year and its periods.
    pub async fn update<C: ConnectionTrait>(db: &C, year: FiscalYear) -> Result<(), StoreError> {
        Self::check_single_active(db, &year).await?;
        match year_model(&year).update(db).await {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => {
                return Err(StoreError::RecordNotFound(format!("fiscal year {}", year.id)));
            }
            Err(err) => return Err(err.into()),
        }
        for period in &year.periods {
            period_model(period)?.update(db).await?;
        }
        Ok(())
    }

    /// The active year, with periods.
    pub async fn find_active<C: ConnectionTrait>(db: &C) -> Result<Option<FiscalYear>, StoreError> {
        let model = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::Status.eq(sea_orm_active_enums::FiscalYearStatus::Active))
            .one(db)
            .await?;
        Self::with_periods(db, model).await
    }

    /// A year by calendar year, with periods.
    pub async fn find_by_year<C: ConnectionTrait>(
        db: &C,
        year: i32,
    ) -> Result<Option<FiscalYear>, StoreError> {
        let model = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::Year.eq(year))
            .one(db)
            .await?;
        Self::with_periods(db, model).await
    }

    /// A year by id, with periods.
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: FiscalYearId,
    ) -> Result<Option<FiscalYear>, StoreError> {
        let model = fiscal_years::Entity::find_by_id(id.into_inner()).one(db).await?;
        Self::with_periods(db, model).await
    }

    async fn with_periods<C: ConnectionTrait>(
        db: &C,
        model: Option<fiscal_years::Model>,
    ) -> Result<Option<FiscalYear>, StoreError> {
        let Some(model) = model else {
            return Ok(None);
        };
        let periods = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::FiscalYearId.eq(model.id))
            .order_by_asc(fiscal_periods::Column::Month)
            .all(db)
            .await?
            .into_iter()
            .map(into_period)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(FiscalYear {
            id: FiscalYearId::from_uuid(model.id),
            year: model.year,
            start_date: model.start_date,
            end_date: model.end_date,
            status: model.status.into(),
            closed_by: model.closed_by,
            closed_at: model.closed_at,
            periods,
        }))
    }

    async fn check_single_active<C: ConnectionTrait>(
        db: &C,
        year: &FiscalYear,
    ) -> Result<(), StoreError> {
        if year.status != FiscalYearStatus::Active {
            return Ok(());
        }
        let other_active = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::Status.eq(sea_orm_active_enums::FiscalYearStatus::Active))
            .filter(fiscal_years::Column::Id.ne(year.id.into_inner()))
            .count(db)
            .await?;
        if other_active > 0 {
            return Err(StoreError::Constraint(
                "only one fiscal year can be active".to_string(),
            ));
        }
        Ok(())
    }
}

fn year_model(year: &FiscalYear) -> fiscal_years::ActiveModel {
    fiscal_years::ActiveModel {
        id: Set(year.id.into_inner()),
        year: Set(year.year),
        start_date: Set(year.start_date),
        end_date: Set(year.end_date),
        status: Set(year.status.into()),
        closed_by: Set(year.closed_by.clone()),
        closed_at: Set(year.closed_at),
    }
}

fn period_model(period: &FiscalPeriod) -> Result<fiscal_periods::ActiveModel, StoreError> {
    Ok(fiscal_periods::ActiveModel {
        id: Set(period.id.into_inner()),
        fiscal_year_id: Set(period.fiscal_year_id.into_inner()),
        year: Set(period.year),
        month: Set(signed("month", period.month)?),
        start_date: Set(period.start_date),
        end_date: Set(period.end_date),
        status: Set(period.status.into()),
        closed_by: Set(period.closed_by.clone()),
        closed_at: Set(period.closed_at),
        reopen_reason: Set(period.reopen_reason.clone()),
    })
}

fn into_period(model: fiscal_periods::Model) -> Result<FiscalPeriod, StoreError> {
    Ok(FiscalPeriod {
        id: FiscalPeriodId::from_uuid(model.id),
        fiscal_year_id: FiscalYearId::from_uuid(model.fiscal_year_id),
        year: model.year,
        month: unsigned("month", model.month)?,
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status.into(),
        closed_by: model.closed_by,
        closed_at: model.closed_at,
        reopen_reason: model.reopen_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::Utc;
    use tally_core::fiscal::PeriodStatus;

    fn active(year: i32) -> FiscalYear {
        let mut fy = FiscalYear::new(year).unwrap();
        fy.activate().unwrap();
        fy
    }

    #[tokio::test]
    async fn test_find_active_and_by_year() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        FiscalRepository::insert(conn, FiscalYear::new(2025).unwrap()).await.unwrap();
        assert!(FiscalRepository::find_active(conn).await.unwrap().is_none());

        let current = active(2026);
        let id = current.id;
        FiscalRepository::insert(conn, current.clone()).await.unwrap();

        assert_eq!(FiscalRepository::find_active(conn).await.unwrap().unwrap().id, id);
        let previous = FiscalRepository::find_by_year(conn, 2025).await.unwrap().unwrap();
        assert_eq!(previous.periods.len(), 12);
        assert_eq!(previous.periods[11].month, 12);
        assert_eq!(FiscalRepository::find_by_id(conn, id).await.unwrap().unwrap(), current);
    }

    #[tokio::test]
    async fn test_update_saves_period_status() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let mut year = active(2026);
        FiscalRepository::insert(conn, year.clone()).await.unwrap();

        year.periods[2].status = PeriodStatus::Closed;
        year.periods[2].closed_by = Some("auditor".to_string());
        year.periods[2].closed_at = Some(Utc::now());
        FiscalRepository::update(conn, year.clone()).await.unwrap();

        let stored = FiscalRepository::find_by_id(conn, year.id).await.unwrap().unwrap();
        assert_eq!(stored.periods[2].status, PeriodStatus::Closed);
        assert_eq!(stored.periods[2].closed_by.as_deref(), Some("auditor"));
    }

    #[tokio::test]
    async fn test_second_active_year_rejected() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        FiscalRepository::insert(conn, active(2026)).await.unwrap();

        let mut next = FiscalYear::new(2027).unwrap();
        FiscalRepository::insert(conn, next.clone()).await.unwrap();
        next.activate().unwrap();

        assert!(matches!(
            FiscalRepository::update(conn, next).await,
            Err(StoreError::Constraint(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_year_rejected() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        FiscalRepository::insert(conn, FiscalYear::new(2026).unwrap()).await.unwrap();
        assert!(matches!(
            FiscalRepository::insert(conn, FiscalYear::new(2026).unwrap()).await,
            Err(StoreError::Duplicate(_))
        ));
    }
}
