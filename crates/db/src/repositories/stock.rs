//! Warehouse stock levels and the movement log.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tally_core::inventory::{InventoryMovement, WarehouseProduct};
use tally_shared::types::{MovementId, ProductId, WarehouseId};

use crate::columns::decimal;
use crate::entities::{inventory_movements, warehouse_products};
use crate::error::StoreError;

/// Stock repository.
#[derive(Debug, Clone, Copy)]
pub struct StockRepository;

impl StockRepository {
    /// The stock record for a product in a warehouse, empty if none exists yet.
    pub async fn get_or_create<C: ConnectionTrait>(
        db: &C,
        warehouse_id: WarehouseId,
        product_id: ProductId,
    ) -> Result<WarehouseProduct, StoreError> {
        Ok(find(db, warehouse_id, product_id)
            .await?
            .unwrap_or_else(|| WarehouseProduct::new(warehouse_id, product_id)))
    }

    /// Saves a stock level.
    pub async fn save<C: ConnectionTrait>(db: &C, stock: WarehouseProduct) -> Result<(), StoreError> {
        let exists = warehouse_products::Entity::find_by_id((
            stock.warehouse_id.into_inner(),
            stock.product_id.into_inner(),
        ))
        .one(db)
        .await?
        .is_some();

        let model = warehouse_products::ActiveModel {
            warehouse_id: Set(stock.warehouse_id.into_inner()),
            product_id: Set(stock.product_id.into_inner()),
            quantity: Set(stock.quantity.to_string()),
        };
        if exists {
            model.update(db).await?;
        } else {
            model.insert(db).await?;
        }
        Ok(())
    }

    /// Quantity on hand, zero when untracked.
    pub async fn quantity<C: ConnectionTrait>(
        db: &C,
        warehouse_id: WarehouseId,
        product_id: ProductId,
    ) -> Result<Decimal, StoreError> {
        Ok(find(db, warehouse_id, product_id)
            .await?
            .map_or(Decimal::ZERO, |s| s.quantity))
    }

    /// Appends a movement.
    pub async fn record_movement<C: ConnectionTrait>(
        db: &C,
        movement: InventoryMovement,
    ) -> Result<(), StoreError> {
        inventory_movements::ActiveModel {
            id: Set(movement.id.into_inner()),
            warehouse_id: Set(movement.warehouse_id.into_inner()),
            product_id: Set(movement.product_id.into_inner()),
            direction: Set(movement.direction.into()),
            quantity: Set(movement.quantity.to_string()),
            unit_cost: Set(movement.unit_cost.to_string()),
            total_cost: Set(movement.total_cost.to_string()),
            date: Set(movement.date),
            source_number: Set(movement.source_number),
            source_type: Set(movement.source_type.into()),
            balance_after: Set(movement.balance_after.to_string()),
            created_at: Set(movement.created_at),
        }
        .insert(db)
        .await?;
        Ok(())
    }

    /// Movements written by a document, in order.
    pub async fn movements_for<C: ConnectionTrait>(
        db: &C,
        source_number: &str,
    ) -> Result<Vec<InventoryMovement>, StoreError> {
        inventory_movements::Entity::find()
            .filter(inventory_movements::Column::SourceNumber.eq(source_number))
            .order_by_asc(inventory_movements::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(into_movement)
            .collect()
    }
}

async fn find<C: ConnectionTrait>(
    db: &C,
    warehouse_id: WarehouseId,
    product_id: ProductId,
) -> Result<Option<WarehouseProduct>, StoreError> {
    let model = warehouse_products::Entity::find_by_id((
        warehouse_id.into_inner(),
        product_id.into_inner(),
    ))
    .one(db)
    .await?;
    model
        .map(|m| {
            Ok(WarehouseProduct {
                warehouse_id,
                product_id,
                quantity: decimal("quantity", &m.quantity)?,
            })
        })
        .transpose()
}

fn into_movement(model: inventory_movements::Model) -> Result<InventoryMovement, StoreError> {
    Ok(InventoryMovement {
        id: MovementId::from_uuid(model.id),
        warehouse_id: WarehouseId::from_uuid(model.warehouse_id),
        product_id: ProductId::from_uuid(model.product_id),
        direction: model.direction.into(),
        quantity: decimal("quantity", &model.quantity)?,
        unit_cost: decimal("unit_cost", &model.unit_cost)?,
        total_cost: decimal("total_cost", &model.total_cost)?,
        date: model.date,
        source_number: model.source_number,
        source_type: model.source_type.into(),
        balance_after: decimal("balance_after", &model.balance_after)?,
        created_at: model.created_at,
    })
}
