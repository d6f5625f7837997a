//! `SeaORM` entity for the inventory_adjustments table.

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::DocumentStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub date: Date,
    pub status: DocumentStatus,
    pub journal_entry_id: Option<Uuid>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub posted_at: Option<DateTimeUtc>,
    pub cancelled_at: Option<DateTimeUtc>,
    pub deleted_by: Option<String>,
    pub deleted_at: Option<DateTimeUtc>,
    pub warehouse_id: Uuid,
    pub reason: String,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::adjustment_lines::Entity")]
    AdjustmentLines,
}

impl Related<super::adjustment_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdjustmentLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
