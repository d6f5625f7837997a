//! `SeaORM` entity for the adjustment_lines table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "adjustment_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub adjustment_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub line_number: i32,
    pub product_id: Uuid,
    pub unit_id: Uuid,
    pub system_quantity: String,
    pub actual_quantity: String,
    pub conversion_factor: String,
    pub unit_cost: String,
    pub difference_quantity: String,
    pub difference_base: String,
    pub cost_difference: String,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_adjustments::Entity",
        from = "Column::AdjustmentId",
        to = "super::inventory_adjustments::Column::Id"
    )]
    InventoryAdjustments,
}

impl Related<super::inventory_adjustments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryAdjustments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
