//! `SeaORM` entity for the cash_payments table.

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::DocumentStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_payments")]
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
    pub cashbox_id: Uuid,
    pub contra_account_id: Uuid,
    pub amount: String,
    pub description: String,
    pub notes: Option<String>,
    pub supplier: Option<String>,
    pub purchase_invoice_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
