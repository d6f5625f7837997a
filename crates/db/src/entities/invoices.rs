//! `SeaORM` entity for the invoices table.

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{InvoiceKind, InvoiceStatus, PaymentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub number: String,
    pub kind: InvoiceKind,
    pub status: InvoiceStatus,
    pub net_total: String,
    pub paid_amount: String,
    pub payment_status: PaymentStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
