//! `SeaORM` entity for the inventory_movements table (append-only).

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{MovementDirection, SourceType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub warehouse_id: Uuid,
    pub product_id: Uuid,
    pub direction: MovementDirection,
    pub quantity: String,
    pub unit_cost: String,
    pub total_cost: String,
    pub date: Date,
    pub source_number: String,
    pub source_type: SourceType,
    pub balance_after: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
