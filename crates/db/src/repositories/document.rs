//! Storage for the four transaction documents.
//!
//! Soft-deleted drafts stay in their table but are invisible to `find`
//! and `list`.

use std::future::Future;
use std::marker::PhantomData;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tally_core::document::{Document, DocumentHeader, DocumentKind};
use tally_core::inventory::{AdjustmentLine, InventoryAdjustment};
use tally_core::treasury::{CashPayment, CashReceipt, CashTransfer};
use tally_shared::types::{
    AccountId, CashPaymentId, CashReceiptId, CashTransferId, CashboxId, InventoryAdjustmentId,
    InvoiceId, JournalEntryId, ProductId, UnitId, WarehouseId,
};
use uuid::Uuid;

use crate::columns::{decimal, signed, unsigned};
use crate::entities::{
    adjustment_lines, cash_payments, cash_receipts, cash_transfers, inventory_adjustments,
};
use crate::error::StoreError;

/// Builds an active model from the shared header columns plus the listed
/// document columns.
macro_rules! document_model {
    ($entity:ident, $id:expr, $header:expr, { $($field:ident: $value:expr),* $(,)? }) => {
        $entity::ActiveModel {
            id: Set($id),
            number: Set($header.number.clone()),
            date: Set($header.date),
            status: Set($header.status.into()),
            journal_entry_id: Set($header.journal_entry_id.map(JournalEntryId::into_inner)),
            created_by: Set($header.created_by.clone()),
            created_at: Set($header.created_at),
            posted_at: Set($header.posted_at),
            cancelled_at: Set($header.cancelled_at),
            deleted_by: Set($header.deleted_by.clone()),
            deleted_at: Set($header.deleted_at),
            $($field: Set($value),)*
        }
    };
}

/// Rebuilds the header from a row's shared columns.
macro_rules! document_header {
    ($kind:expr, $model:ident) => {
        DocumentHeader {
            kind: $kind,
            number: $model.number,
            date: $model.date,
            status: $model.status.into(),
            journal_entry_id: $model.journal_entry_id.map(JournalEntryId::from_uuid),
            created_by: $model.created_by,
            created_at: $model.created_at,
            posted_at: $model.posted_at,
            cancelled_at: $model.cancelled_at,
            deleted_by: $model.deleted_by,
            deleted_at: $model.deleted_at,
        }
    };
}

/// A document type with its own table.
pub trait StoredDocument: Document {
    /// Returns true if a row with `id` exists, soft-deleted or not.
    fn exists<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Writes a new row.
    fn insert_row<C: ConnectionTrait>(
        db: &C,
        document: &Self,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrites an existing row.
    fn update_row<C: ConnectionTrait>(
        db: &C,
        document: &Self,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads a live row.
    fn find_live<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Self>, StoreError>> + Send;

    /// Reads every live row in creation order.
    fn list_live<C: ConnectionTrait>(
        db: &C,
    ) -> impl Future<Output = Result<Vec<Self>, StoreError>> + Send;
}

fn not_updated(kind: DocumentKind, id: Uuid, err: DbErr) -> StoreError {
    match err {
        DbErr::RecordNotUpdated => StoreError::RecordNotFound(format!("{kind} {id}")),
        err => err.into(),
    }
}

impl StoredDocument for CashPayment {
    async fn exists<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, StoreError> {
        Ok(cash_payments::Entity::find_by_id(id).one(db).await?.is_some())
    }

    async fn insert_row<C: ConnectionTrait>(db: &C, document: &Self) -> Result<(), StoreError> {
        payment_model(document).insert(db).await?;
        Ok(())
    }

    async fn update_row<C: ConnectionTrait>(db: &C, document: &Self) -> Result<(), StoreError> {
        payment_model(document)
            .update(db)
            .await
            .map_err(|e| not_updated(Self::KIND, document.source_id(), e))?;
        Ok(())
    }

    async fn find_live<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, StoreError> {
        cash_payments::Entity::find_by_id(id)
            .filter(cash_payments::Column::DeletedAt.is_null())
            .one(db)
            .await?
            .map(into_payment)
            .transpose()
    }

    async fn list_live<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, StoreError> {
        cash_payments::Entity::find()
            .filter(cash_payments::Column::DeletedAt.is_null())
            .order_by_asc(cash_payments::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(into_payment)
            .collect()
    }
}

fn payment_model(p: &CashPayment) -> cash_payments::ActiveModel {
    document_model!(cash_payments, p.id.into_inner(), p.header, {
        cashbox_id: p.cashbox_id.into_inner(),
        contra_account_id: p.contra_account_id.into_inner(),
        amount: p.amount.to_string(),
        description: p.description.clone(),
        notes: p.notes.clone(),
        supplier: p.supplier.clone(),
        purchase_invoice_id: p.purchase_invoice_id.map(InvoiceId::into_inner),
    })
}

fn into_payment(m: cash_payments::Model) -> Result<CashPayment, StoreError> {
    let amount = decimal("amount", &m.amount)?;
    Ok(CashPayment {
        id: CashPaymentId::from_uuid(m.id),
        cashbox_id: CashboxId::from_uuid(m.cashbox_id),
        contra_account_id: AccountId::from_uuid(m.contra_account_id),
        amount,
        description: m.description,
        notes: m.notes,
        supplier: m.supplier,
        purchase_invoice_id: m.purchase_invoice_id.map(InvoiceId::from_uuid),
        header: document_header!(DocumentKind::CashPayment, m),
    })
}

impl StoredDocument for CashReceipt {
    async fn exists<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, StoreError> {
        Ok(cash_receipts::Entity::find_by_id(id).one(db).await?.is_some())
    }

    async fn insert_row<C: ConnectionTrait>(db: &C, document: &Self) -> Result<(), StoreError> {
        receipt_model(document).insert(db).await?;
        Ok(())
    }

    async fn update_row<C: ConnectionTrait>(db: &C, document: &Self) -> Result<(), StoreError> {
        receipt_model(document)
            .update(db)
            .await
            .map_err(|e| not_updated(Self::KIND, document.source_id(), e))?;
        Ok(())
    }

    async fn find_live<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, StoreError> {
        cash_receipts::Entity::find_by_id(id)
            .filter(cash_receipts::Column::DeletedAt.is_null())
            .one(db)
            .await?
            .map(into_receipt)
            .transpose()
    }

    async fn list_live<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, StoreError> {
        cash_receipts::Entity::find()
            .filter(cash_receipts::Column::DeletedAt.is_null())
            .order_by_asc(cash_receipts::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(into_receipt)
            .collect()
    }
}

fn receipt_model(r: &CashReceipt) -> cash_receipts::ActiveModel {
    document_model!(cash_receipts, r.id.into_inner(), r.header, {
        cashbox_id: r.cashbox_id.into_inner(),
        contra_account_id: r.contra_account_id.into_inner(),
        amount: r.amount.to_string(),
        description: r.description.clone(),
        notes: r.notes.clone(),
        customer: r.customer.clone(),
        sales_invoice_id: r.sales_invoice_id.map(InvoiceId::into_inner),
    })
}

fn into_receipt(m: cash_receipts::Model) -> Result<CashReceipt, StoreError> {
    let amount = decimal("amount", &m.amount)?;
    Ok(CashReceipt {
        id: CashReceiptId::from_uuid(m.id),
        cashbox_id: CashboxId::from_uuid(m.cashbox_id),
        contra_account_id: AccountId::from_uuid(m.contra_account_id),
        amount,
        description: m.description,
        notes: m.notes,
        customer: m.customer,
        sales_invoice_id: m.sales_invoice_id.map(InvoiceId::from_uuid),
        header: document_header!(DocumentKind::CashReceipt, m),
    })
}

impl StoredDocument for CashTransfer {
    async fn exists<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, StoreError> {
        Ok(cash_transfers::Entity::find_by_id(id).one(db).await?.is_some())
    }

    async fn insert_row<C: ConnectionTrait>(db: &C, document: &Self) -> Result<(), StoreError> {
        transfer_model(document).insert(db).await?;
        Ok(())
    }

    async fn update_row<C: ConnectionTrait>(db: &C, document: &Self) -> Result<(), StoreError> {
        transfer_model(document)
            .update(db)
            .await
            .map_err(|e| not_updated(Self::KIND, document.source_id(), e))?;
        Ok(())
    }

    async fn find_live<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, StoreError> {
        cash_transfers::Entity::find_by_id(id)
            .filter(cash_transfers::Column::DeletedAt.is_null())
            .one(db)
            .await?
            .map(into_transfer)
            .transpose()
    }

    async fn list_live<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, StoreError> {
        cash_transfers::Entity::find()
            .filter(cash_transfers::Column::DeletedAt.is_null())
            .order_by_asc(cash_transfers::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(into_transfer)
            .collect()
    }
}

fn transfer_model(t: &CashTransfer) -> cash_transfers::ActiveModel {
    document_model!(cash_transfers, t.id.into_inner(), t.header, {
        from_cashbox_id: t.from_cashbox_id.into_inner(),
        to_cashbox_id: t.to_cashbox_id.into_inner(),
        amount: t.amount.to_string(),
        description: t.description.clone(),
        notes: t.notes.clone(),
    })
}

fn into_transfer(m: cash_transfers::Model) -> Result<CashTransfer, StoreError> {
    let amount = decimal("amount", &m.amount)?;
    Ok(CashTransfer {
        id: CashTransferId::from_uuid(m.id),
        from_cashbox_id: CashboxId::from_uuid(m.from_cashbox_id),
        to_cashbox_id: CashboxId::from_uuid(m.to_cashbox_id),
        amount,
        description: m.description,
        notes: m.notes,
        header: document_header!(DocumentKind::CashTransfer, m),
    })
}

impl StoredDocument for InventoryAdjustment {
    async fn exists<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, StoreError> {
        Ok(inventory_adjustments::Entity::find_by_id(id)
            .one(db)
            .await?
            .is_some())
    }

    async fn insert_row<C: ConnectionTrait>(db: &C, document: &Self) -> Result<(), StoreError> {
        adjustment_model(document).insert(db).await?;
        insert_adjustment_lines(db, document).await
    }

    async fn update_row<C: ConnectionTrait>(db: &C, document: &Self) -> Result<(), StoreError> {
        let id = document.source_id();
        adjustment_model(document)
            .update(db)
            .await
            .map_err(|e| not_updated(Self::KIND, id, e))?;
        adjustment_lines::Entity::delete_many()
            .filter(adjustment_lines::Column::AdjustmentId.eq(id))
            .exec(db)
            .await?;
        insert_adjustment_lines(db, document).await
    }

    async fn find_live<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, StoreError> {
        let model = inventory_adjustments::Entity::find_by_id(id)
            .filter(inventory_adjustments::Column::DeletedAt.is_null())
            .one(db)
            .await?;
        match model {
            Some(model) => Ok(Some(load_adjustment(db, model).await?)),
            None => Ok(None),
        }
    }

    async fn list_live<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, StoreError> {
        let models = inventory_adjustments::Entity::find()
            .filter(inventory_adjustments::Column::DeletedAt.is_null())
            .order_by_asc(inventory_adjustments::Column::Id)
            .all(db)
            .await?;
        let mut adjustments = Vec::with_capacity(models.len());
        for model in models {
            adjustments.push(load_adjustment(db, model).await?);
        }
        Ok(adjustments)
    }
}

fn adjustment_model(a: &InventoryAdjustment) -> inventory_adjustments::ActiveModel {
    document_model!(inventory_adjustments, a.id.into_inner(), a.header, {
        warehouse_id: a.warehouse_id.into_inner(),
        reason: a.reason.clone(),
        notes: a.notes.clone(),
    })
}

async fn insert_adjustment_lines<C: ConnectionTrait>(
    db: &C,
    adjustment: &InventoryAdjustment,
) -> Result<(), StoreError> {
    let adjustment_id = adjustment.id.into_inner();
    for line in adjustment.lines() {
        adjustment_lines::ActiveModel {
            adjustment_id: Set(adjustment_id),
            line_number: Set(signed("line_number", line.line_number)?),
            product_id: Set(line.product_id.into_inner()),
            unit_id: Set(line.unit_id.into_inner()),
            system_quantity: Set(line.system_quantity.to_string()),
            actual_quantity: Set(line.actual_quantity.to_string()),
            conversion_factor: Set(line.conversion_factor.to_string()),
            unit_cost: Set(line.unit_cost.to_string()),
            difference_quantity: Set(line.difference_quantity.to_string()),
            difference_base: Set(line.difference_base.to_string()),
            cost_difference: Set(line.cost_difference.to_string()),
            notes: Set(line.notes.clone()),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn load_adjustment<C: ConnectionTrait>(
    db: &C,
    m: inventory_adjustments::Model,
) -> Result<InventoryAdjustment, StoreError> {
    let lines = adjustment_lines::Entity::find()
        .filter(adjustment_lines::Column::AdjustmentId.eq(m.id))
        .order_by_asc(adjustment_lines::Column::LineNumber)
        .all(db)
        .await?
        .into_iter()
        .map(into_adjustment_line)
        .collect::<Result<Vec<_>, _>>()?;

    let id = InventoryAdjustmentId::from_uuid(m.id);
    let warehouse_id = WarehouseId::from_uuid(m.warehouse_id);
    let (reason, notes) = (m.reason.clone(), m.notes.clone());
    let header = document_header!(DocumentKind::InventoryAdjustment, m);
    Ok(InventoryAdjustment::restore(id, header, warehouse_id, reason, notes, lines))
}

fn into_adjustment_line(l: adjustment_lines::Model) -> Result<AdjustmentLine, StoreError> {
    Ok(AdjustmentLine {
        line_number: unsigned("line_number", l.line_number)?,
        product_id: ProductId::from_uuid(l.product_id),
        unit_id: UnitId::from_uuid(l.unit_id),
        system_quantity: decimal("system_quantity", &l.system_quantity)?,
        actual_quantity: decimal("actual_quantity", &l.actual_quantity)?,
        conversion_factor: decimal("conversion_factor", &l.conversion_factor)?,
        unit_cost: decimal("unit_cost", &l.unit_cost)?,
        difference_quantity: decimal("difference_quantity", &l.difference_quantity)?,
        difference_base: decimal("difference_base", &l.difference_base)?,
        cost_difference: decimal("cost_difference", &l.cost_difference)?,
        notes: l.notes,
    })
}

/// Document repository, one per document type.
#[derive(Debug)]
pub struct DocumentRepository<D>(PhantomData<D>);

impl<D: StoredDocument> DocumentRepository<D> {
    /// Inserts a new document.
    pub async fn insert<C: ConnectionTrait>(db: &C, document: D) -> Result<(), StoreError> {
        let id = document.source_id();
        if D::exists(db, id).await? {
            return Err(StoreError::Duplicate(format!("{} {id}", D::KIND)));
        }
        D::insert_row(db, &document).await
    }

    /// Saves a changed document.
    pub async fn update<C: ConnectionTrait>(db: &C, document: D) -> Result<(), StoreError> {
        D::update_row(db, &document).await
    }

    /// A live (not soft-deleted) document by id.
    pub async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<D>, StoreError> {
        D::find_live(db, id).await
    }

    /// Live documents in creation order.
    pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<D>, StoreError> {
        D::list_live(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use tally_core::inventory::{AdjustmentLineInput, InventoryAdjustmentInput};
    use tally_core::treasury::CashTransferInput;

    fn transfer(number: &str) -> CashTransfer {
        CashTransfer::create(
            number.to_string(),
            CashTransferInput {
                date: NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
                from_cashbox_id: CashboxId::new(),
                to_cashbox_id: CashboxId::new(),
                amount: dec!(10),
                description: "Float".to_string(),
                notes: None,
            },
            "frank",
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_soft_deleted_documents_are_hidden() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let keep = transfer("CT-202603-0001");
        let mut gone = transfer("CT-202603-0002");
        DocumentRepository::insert(conn, keep.clone()).await.unwrap();
        DocumentRepository::insert(conn, gone.clone()).await.unwrap();

        gone.header.mark_deleted("frank", Utc::now()).unwrap();
        DocumentRepository::update(conn, gone.clone()).await.unwrap();

        let listed = DocumentRepository::<CashTransfer>::list(conn).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);
        assert!(
            DocumentRepository::<CashTransfer>::find(conn, gone.source_id())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let doc = transfer("CT-1");
        DocumentRepository::insert(conn, doc.clone()).await.unwrap();
        assert!(matches!(
            DocumentRepository::insert(conn, doc).await,
            Err(StoreError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_update_unknown_document_fails() {
        let db = Database::in_memory().await.unwrap();
        assert!(matches!(
            DocumentRepository::update(db.connection(), transfer("CT-9")).await,
            Err(StoreError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_adjustment_round_trips_with_lines() {
        let db = Database::in_memory().await.unwrap();
        let conn = db.connection();
        let line = |product_id| AdjustmentLineInput {
            product_id,
            unit_id: UnitId::new(),
            system_quantity: dec!(10),
            actual_quantity: dec!(12),
            conversion_factor: dec!(1),
            unit_cost: dec!(2.5000),
            notes: None,
        };
        let mut adjustment = InventoryAdjustment::create(
            "ADJ-202603-0001".to_string(),
            InventoryAdjustmentInput {
                date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
                warehouse_id: WarehouseId::new(),
                reason: "Stock count".to_string(),
                notes: None,
                lines: vec![line(ProductId::new()), line(ProductId::new())],
            },
            "dave",
            Utc::now(),
        )
        .unwrap();
        DocumentRepository::insert(conn, adjustment.clone()).await.unwrap();

        adjustment.remove_line(1).unwrap();
        DocumentRepository::update(conn, adjustment.clone()).await.unwrap();

        let stored = DocumentRepository::<InventoryAdjustment>::find(conn, adjustment.source_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.header.number, "ADJ-202603-0001");
        assert_eq!(stored.lines(), adjustment.lines());
        assert_eq!(stored.lines().len(), 1);
        assert_eq!(stored.lines()[0].cost_difference, dec!(5.0000));
    }
}
