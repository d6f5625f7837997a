//! Gapless number allocation.
//!
//! Counters live in the database and are bumped inside the caller's unit
//! of work: a rolled-back unit also rolls back its numbers.

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tally_core::document::DocumentKind;
use tally_core::numbering::{format_document_number, format_journal_number, month_key};
use tally_shared::types::FiscalYearId;

use crate::columns::counter;
use crate::entities::{document_sequences, journal_sequences};
use crate::error::StoreError;

/// Sequence repository.
#[derive(Debug, Clone, Copy)]
pub struct SequenceRepository;

impl SequenceRepository {
    /// Allocates the next document number for `kind` in the month of `date`.
    pub async fn next_document_number<C: ConnectionTrait>(
        db: &C,
        kind: DocumentKind,
        prefix: &str,
        date: NaiveDate,
    ) -> Result<String, StoreError> {
        let key = (kind.source_type().as_str().to_string(), month_key(date));
        let next = match document_sequences::Entity::find_by_id(key.clone()).one(db).await? {
            Some(model) => {
                let next = model.last_value + 1;
                let mut active: document_sequences::ActiveModel = model.into();
                active.last_value = Set(next);
                active.update(db).await?;
                next
            }
            None => {
                document_sequences::ActiveModel {
                    kind: Set(key.0),
                    month_key: Set(key.1),
                    last_value: Set(1),
                }
                .insert(db)
                .await?;
                1
            }
        };
        Ok(format_document_number(prefix, date, counter("last_value", next)?))
    }

    /// The number the next allocation would return, without reserving it.
    pub async fn peek_document_number<C: ConnectionTrait>(
        db: &C,
        kind: DocumentKind,
        prefix: &str,
        date: NaiveDate,
    ) -> Result<String, StoreError> {
        let key = (kind.source_type().as_str().to_string(), month_key(date));
        let current = document_sequences::Entity::find_by_id(key)
            .one(db)
            .await?
            .map_or(0, |m| m.last_value);
        Ok(format_document_number(prefix, date, counter("last_value", current)? + 1))
    }

    /// Allocates the next journal number within a fiscal year.
    pub async fn next_journal_number<C: ConnectionTrait>(
        db: &C,
        fiscal_year_id: FiscalYearId,
        prefix: &str,
        width: usize,
    ) -> Result<String, StoreError> {
        let id = fiscal_year_id.into_inner();
        let next = match journal_sequences::Entity::find_by_id(id).one(db).await? {
            Some(model) => {
                let next = model.last_value + 1;
                let mut active: journal_sequences::ActiveModel = model.into();
                active.last_value = Set(next);
                active.update(db).await?;
                next
            }
            None => {
                journal_sequences::ActiveModel {
                    fiscal_year_id: Set(id),
                    last_value: Set(1),
                }
                .insert(db)
                .await?;
                1
            }
        };
        Ok(format_journal_number(prefix, width, counter("last_value", next)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_document_numbers_restart_each_month() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let kind = DocumentKind::CashPayment;

        for (d, expected) in [
            (date(3, 1), "CP-202603-0001"),
            (date(3, 31), "CP-202603-0002"),
            (date(4, 1), "CP-202604-0001"),
        ] {
            assert_eq!(
                SequenceRepository::next_document_number(conn, kind, "CP", d)
                    .await
                    .unwrap(),
                expected
            );
        }
    }

    #[tokio::test]
    async fn test_kinds_have_separate_counters() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        SequenceRepository::next_document_number(conn, DocumentKind::CashPayment, "CP", date(3, 1))
            .await
            .unwrap();
        assert_eq!(
            SequenceRepository::next_document_number(conn, DocumentKind::CashReceipt, "CR", date(3, 1))
                .await
                .unwrap(),
            "CR-202603-0001"
        );
    }

    #[tokio::test]
    async fn test_peek_does_not_reserve() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let kind = DocumentKind::InventoryAdjustment;
        for _ in 0..2 {
            assert_eq!(
                SequenceRepository::peek_document_number(conn, kind, "ADJ", date(5, 5))
                    .await
                    .unwrap(),
                "ADJ-202605-0001"
            );
        }
        SequenceRepository::next_document_number(conn, kind, "ADJ", date(5, 5))
            .await
            .unwrap();
        assert_eq!(
            SequenceRepository::peek_document_number(conn, kind, "ADJ", date(5, 5))
                .await
                .unwrap(),
            "ADJ-202605-0002"
        );
    }

    #[tokio::test]
    async fn test_journal_numbers_per_fiscal_year() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let (fy1, fy2) = (FiscalYearId::new(), FiscalYearId::new());

        for (fy, expected) in [(fy1, "JV-000001"), (fy1, "JV-000002"), (fy2, "JV-000001")] {
            assert_eq!(
                SequenceRepository::next_journal_number(conn, fy, "JV", 6)
                    .await
                    .unwrap(),
                expected
            );
        }
    }

    #[tokio::test]
    async fn test_rolled_back_unit_releases_number() {
        let db = Database::in_memory().await.unwrap();
        let kind = DocumentKind::CashTransfer;

        let txn = db.begin().await.unwrap();
        SequenceRepository::next_document_number(&txn, kind, "CT", date(6, 1))
            .await
            .unwrap();
        drop(txn);

        assert_eq!(
            SequenceRepository::next_document_number(db.connection(), kind, "CT", date(6, 1))
                .await
                .unwrap(),
            "CT-202606-0001"
        );
    }
}
