//! `SeaORM` entity for the journal_entries table.

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{JournalStatus, SourceType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub draft_code: String,
    pub journal_number: Option<String>,
    pub journal_date: Date,
    pub description: String,
    pub reference_number: Option<String>,
    pub source_type: SourceType,
    pub source_id: Option<Uuid>,
    pub fiscal_year_id: Uuid,
    pub fiscal_period_id: Uuid,
    pub status: JournalStatus,
    pub posted_by: Option<String>,
    pub posted_at: Option<DateTimeUtc>,
    pub reversed_entry_id: Option<Uuid>,
    pub reversal_entry_id: Option<Uuid>,
    pub reversal_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
