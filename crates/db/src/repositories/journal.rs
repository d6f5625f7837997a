//! Journal entry storage.
//!
//! Entries are stored as a header row plus line rows. Posted entries are
//! never removed; the only later write is the reversal marker.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tally_core::ledger::{AccountBalance, JournalEntry, JournalEntryRecord, JournalLine};
use tally_shared::types::{AccountId, FiscalPeriodId, FiscalYearId, JournalEntryId};
use uuid::Uuid;

use crate::columns::{decimal, signed, unsigned};
use crate::entities::{journal_entries, journal_lines, sea_orm_active_enums};
use crate::error::StoreError;

/// Journal entry repository.
#[derive(Debug, Clone, Copy)]
pub struct JournalRepository;

impl JournalRepository {
    /// Inserts a new entry with its lines.
    pub async fn insert<C: ConnectionTrait>(db: &C, entry: JournalEntry) -> Result<(), StoreError> {
        if journal_entries::Entity::find_by_id(entry.id.into_inner())
            .one(db)
            .await?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!("journal entry {}", entry.id)));
        }
        header_model(&entry).insert(db).await?;
        insert_lines(db, &entry).await
    }

    /// Saves a changed entry. Lines are replaced as a whole.
    pub async fn update<C: ConnectionTrait>(db: &C, entry: JournalEntry) -> Result<(), StoreError> {
        match header_model(&entry).update(db).await {
            Ok(_) => {}
            Err(DbErr::RecordNotUpdated) => {
                return Err(StoreError::RecordNotFound(format!("journal entry {}", entry.id)));
            }
            Err(err) => return Err(err.into()),
        }
        journal_lines::Entity::delete_many()
            .filter(journal_lines::Column::EntryId.eq(entry.id.into_inner()))
            .exec(db)
            .await?;
        insert_lines(db, &entry).await
    }

    /// Removes a draft entry and its lines.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: JournalEntryId) -> Result<(), StoreError> {
        let Some(model) = journal_entries::Entity::find_by_id(id.into_inner()).one(db).await? else {
            return Err(StoreError::RecordNotFound(format!("journal entry {id}")));
        };
        journal_lines::Entity::delete_many()
            .filter(journal_lines::Column::EntryId.eq(model.id))
            .exec(db)
            .await?;
        model.delete(db).await?;
        Ok(())
    }

    /// An entry with its lines.
    pub async fn find_with_lines<C: ConnectionTrait>(
        db: &C,
        id: JournalEntryId,
    ) -> Result<Option<JournalEntry>, StoreError> {
        let model = journal_entries::Entity::find_by_id(id.into_inner()).one(db).await?;
        match model {
            Some(model) => Ok(Some(load(db, model).await?)),
            None => Ok(None),
        }
    }

    /// Every entry booked for a source document, oldest first.
    pub async fn find_by_source<C: ConnectionTrait>(
        db: &C,
        source_id: Uuid,
    ) -> Result<Vec<JournalEntry>, StoreError> {
        let models = journal_entries::Entity::find()
            .filter(journal_entries::Column::SourceId.eq(source_id))
            .order_by_asc(journal_entries::Column::Id)
            .all(db)
            .await?;

        let mut entries = Vec::with_capacity(models.len());
        for model in models {
            entries.push(load(db, model).await?);
        }
        Ok(entries)
    }

    /// Number of stored entries, drafts included.
    pub async fn count<C: ConnectionTrait>(db: &C) -> Result<u64, StoreError> {
        Ok(journal_entries::Entity::find().count(db).await?)
    }

    /// Posted debit and credit totals of one account.
    pub async fn account_balance<C: ConnectionTrait>(
        db: &C,
        account_id: AccountId,
    ) -> Result<AccountBalance, StoreError> {
        let lines = journal_lines::Entity::find()
            .inner_join(journal_entries::Entity)
            .filter(journal_lines::Column::AccountId.eq(account_id.into_inner()))
            .filter(journal_entries::Column::Status.eq(sea_orm_active_enums::JournalStatus::Posted))
            .all(db)
            .await?
            .into_iter()
            .map(into_line)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AccountBalance::from_lines(account_id, &lines))
    }
}

async fn insert_lines<C: ConnectionTrait>(db: &C, entry: &JournalEntry) -> Result<(), StoreError> {
    let entry_id = entry.id.into_inner();
    for line in entry.lines() {
        journal_lines::ActiveModel {
            entry_id: Set(entry_id),
            line_number: Set(signed("line_number", line.line_number)?),
            account_id: Set(line.account_id.into_inner()),
            debit: Set(line.debit.to_string()),
            credit: Set(line.credit.to_string()),
            memo: Set(line.memo.clone()),
            created_at: Set(line.created_at),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn load<C: ConnectionTrait>(
    db: &C,
    model: journal_entries::Model,
) -> Result<JournalEntry, StoreError> {
    let lines = journal_lines::Entity::find()
        .filter(journal_lines::Column::EntryId.eq(model.id))
        .order_by_asc(journal_lines::Column::LineNumber)
        .all(db)
        .await?
        .into_iter()
        .map(into_line)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(JournalEntryRecord {
        id: JournalEntryId::from_uuid(model.id),
        draft_code: model.draft_code,
        journal_number: model.journal_number,
        journal_date: model.journal_date,
        description: model.description,
        reference_number: model.reference_number,
        source_type: model.source_type.into(),
        source_id: model.source_id,
        fiscal_year_id: FiscalYearId::from_uuid(model.fiscal_year_id),
        fiscal_period_id: FiscalPeriodId::from_uuid(model.fiscal_period_id),
        status: model.status.into(),
        posted_by: model.posted_by,
        posted_at: model.posted_at,
        reversed_entry_id: model.reversed_entry_id.map(JournalEntryId::from_uuid),
        reversal_entry_id: model.reversal_entry_id.map(JournalEntryId::from_uuid),
        reversal_reason: model.reversal_reason,
        lines,
    }
    .into())
}

fn header_model(entry: &JournalEntry) -> journal_entries::ActiveModel {
    journal_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        draft_code: Set(entry.draft_code.clone()),
        journal_number: Set(entry.journal_number.clone()),
        journal_date: Set(entry.journal_date),
        description: Set(entry.description.clone()),
        reference_number: Set(entry.reference_number.clone()),
        source_type: Set(entry.source_type.into()),
        source_id: Set(entry.source_id),
        fiscal_year_id: Set(entry.fiscal_year_id.into_inner()),
        fiscal_period_id: Set(entry.fiscal_period_id.into_inner()),
        status: Set(entry.status().into()),
        posted_by: Set(entry.posted_by.clone()),
        posted_at: Set(entry.posted_at),
        reversed_entry_id: Set(entry.reversed_entry_id.map(JournalEntryId::into_inner)),
        reversal_entry_id: Set(entry.reversal_entry_id().map(JournalEntryId::into_inner)),
        reversal_reason: Set(entry.reversal_reason.clone()),
    }
}

fn into_line(model: journal_lines::Model) -> Result<JournalLine, StoreError> {
    Ok(JournalLine {
        line_number: unsigned("line_number", model.line_number)?,
        account_id: AccountId::from_uuid(model.account_id),
        debit: decimal("debit", &model.debit)?,
        credit: decimal("credit", &model.credit)?,
        memo: model.memo,
        created_at: model.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tally_core::ledger::{JournalStatus, NewJournalEntry, SourceType};

    fn entry(debit: AccountId, credit: AccountId, amount: Decimal, source: Uuid) -> JournalEntry {
        let now = Utc::now();
        let mut entry = JournalEntry::create_draft(NewJournalEntry {
            journal_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            description: "Opening cash".to_string(),
            source_type: SourceType::Opening,
            fiscal_year_id: FiscalYearId::new(),
            fiscal_period_id: FiscalPeriodId::new(),
            reference_number: None,
            source_id: Some(source),
        })
        .unwrap();
        entry.add_line(debit, amount, Decimal::ZERO, now, None).unwrap();
        entry.add_line(credit, Decimal::ZERO, amount, now, None).unwrap();
        entry
    }

    #[tokio::test]
    async fn test_balance_counts_posted_entries_only() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let (cash, equity) = (AccountId::new(), AccountId::new());
        let source = Uuid::now_v7();

        let mut posted = entry(cash, equity, dec!(300.00), source);
        posted.post("JV-000001", "System", Utc::now()).unwrap();
        JournalRepository::insert(conn, posted).await.unwrap();
        JournalRepository::insert(conn, entry(cash, equity, dec!(50.00), source))
            .await
            .unwrap();

        let balance = JournalRepository::account_balance(conn, cash).await.unwrap();
        assert_eq!(balance.debit_balance(), dec!(300.00));
        assert_eq!(JournalRepository::count(conn).await.unwrap(), 2);
        assert_eq!(JournalRepository::find_by_source(conn, source).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_lines_read_back_in_order_with_scale() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let stored = entry(AccountId::new(), AccountId::new(), dec!(12.5000), Uuid::now_v7());
        JournalRepository::insert(conn, stored.clone()).await.unwrap();

        let loaded = JournalRepository::find_with_lines(conn, stored.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.status(), JournalStatus::Draft);
        assert_eq!(loaded.lines().len(), 2);
        assert_eq!(loaded.lines()[0].line_number, 1);
        assert_eq!(loaded.lines()[0].debit.to_string(), "12.5000");
        assert_eq!(loaded.draft_code, stored.draft_code);
    }

    #[tokio::test]
    async fn test_update_replaces_lines_and_delete_removes_entry() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let mut draft = entry(AccountId::new(), AccountId::new(), dec!(10), Uuid::now_v7());
        JournalRepository::insert(conn, draft.clone()).await.unwrap();

        draft.remove_line(2).unwrap();
        JournalRepository::update(conn, draft.clone()).await.unwrap();
        let loaded = JournalRepository::find_with_lines(conn, draft.id).await.unwrap().unwrap();
        assert_eq!(loaded.lines().len(), 1);

        JournalRepository::delete(conn, draft.id).await.unwrap();
        assert!(JournalRepository::find_with_lines(conn, draft.id).await.unwrap().is_none());
        assert!(matches!(
            JournalRepository::delete(conn, draft.id).await,
            Err(StoreError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_entry_fails() {
        let db = Database::in_memory().await.unwrap();
        let e = entry(AccountId::new(), AccountId::new(), dec!(1), Uuid::now_v7());
        assert!(matches!(
            JournalRepository::update(db.connection(), e).await,
            Err(StoreError::RecordNotFound(_))
        ));
    }
}
