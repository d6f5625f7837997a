//! Invoice storage.

use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};
use tally_core::settlement::Invoice;
use tally_shared::types::InvoiceId;

use crate::columns::decimal;
use crate::entities::invoices;
use crate::error::StoreError;

/// Invoice repository.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceRepository;

impl InvoiceRepository {
    /// Inserts an invoice.
    pub async fn insert<C: ConnectionTrait>(db: &C, invoice: Invoice) -> Result<(), StoreError> {
        if Self::find_by_id(db, invoice.id).await?.is_some() {
            return Err(StoreError::Duplicate(format!("invoice {}", invoice.id)));
        }
        active_model(&invoice).insert(db).await?;
        Ok(())
    }

    /// Finds an invoice by id.
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: InvoiceId,
    ) -> Result<Option<Invoice>, StoreError> {
        invoices::Entity::find_by_id(id.into_inner())
            .one(db)
            .await?
            .map(into_invoice)
            .transpose()
    }

    /// Saves paid amount and status changes.
    pub async fn update<C: ConnectionTrait>(db: &C, invoice: Invoice) -> Result<(), StoreError> {
        match active_model(&invoice).update(db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => {
                Err(StoreError::RecordNotFound(format!("invoice {}", invoice.id)))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn active_model(invoice: &Invoice) -> invoices::ActiveModel {
    invoices::ActiveModel {
        id: Set(invoice.id.into_inner()),
        number: Set(invoice.number.clone()),
        kind: Set(invoice.kind.into()),
        status: Set(invoice.status.into()),
        net_total: Set(invoice.net_total.to_string()),
        paid_amount: Set(invoice.paid_amount.to_string()),
        payment_status: Set(invoice.payment_status.into()),
    }
}

fn into_invoice(model: invoices::Model) -> Result<Invoice, StoreError> {
    Ok(Invoice {
        id: InvoiceId::from_uuid(model.id),
        number: model.number,
        kind: model.kind.into(),
        status: model.status.into(),
        net_total: decimal("net_total", &model.net_total)?,
        paid_amount: decimal("paid_amount", &model.paid_amount)?,
        payment_status: model.payment_status.into(),
    })
}
