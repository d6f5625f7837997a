//! Warehouse stock levels and the movement log.
//!
//! Quantities are in base units. Every change to a [`WarehouseProduct`]
//! goes through [`StockChange::apply`], which returns the movement record
//! to append.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{MovementId, ProductId, WarehouseId, round_quantity};

use super::error::InventoryError;
use crate::document::DocumentHeader;
use crate::ledger::SourceType;

/// Quantity on hand of one product in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseProduct {
    /// Warehouse holding the stock.
    pub warehouse_id: WarehouseId,
    /// Product stocked.
    pub product_id: ProductId,
    /// Quantity in base units. Never negative.
    pub quantity: Decimal,
}

impl WarehouseProduct {
    /// Empty stock record.
    #[must_use]
    pub fn new(warehouse_id: WarehouseId, product_id: ProductId) -> Self {
        Self {
            warehouse_id,
            product_id,
            quantity: Decimal::ZERO,
        }
    }

    /// Adds `quantity` and returns the new level.
    pub fn increase_stock(&mut self, quantity: Decimal) -> Result<Decimal, InventoryError> {
        if quantity <= Decimal::ZERO {
            return Err(InventoryError::QuantityNotPositive);
        }
        self.quantity += quantity;
        Ok(self.quantity)
    }

    /// Removes `quantity` and returns the new level.
    pub fn decrease_stock(&mut self, quantity: Decimal) -> Result<Decimal, InventoryError> {
        if quantity <= Decimal::ZERO {
            return Err(InventoryError::QuantityNotPositive);
        }
        if quantity > self.quantity {
            return Err(InventoryError::InsufficientStock {
                product_id: self.product_id,
                available: self.quantity,
                required: quantity,
            });
        }
        self.quantity -= quantity;
        Ok(self.quantity)
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    /// Stock in.
    In,
    /// Stock out.
    Out,
}

impl MovementDirection {
    /// The opposite direction.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }
}

impl fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::In => "in",
            Self::Out => "out",
        })
    }
}

/// Append-only record of one stock change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryMovement {
    /// Unique identifier.
    pub id: MovementId,
    /// Warehouse.
    pub warehouse_id: WarehouseId,
    /// Product.
    pub product_id: ProductId,
    /// In or out.
    pub direction: MovementDirection,
    /// Base quantity moved (positive).
    pub quantity: Decimal,
    /// Cost per base unit.
    pub unit_cost: Decimal,
    /// `quantity × unit_cost`, four decimals.
    pub total_cost: Decimal,
    /// Movement date.
    pub date: NaiveDate,
    /// Number of the document that moved the stock.
    pub source_number: String,
    /// Type of the document that moved the stock.
    pub source_type: SourceType,
    /// Stock level after the movement.
    pub balance_after: Decimal,
    /// When the movement was recorded.
    pub created_at: DateTime<Utc>,
}

/// A pending change to one product's stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    /// Product to move.
    pub product_id: ProductId,
    /// In or out.
    pub direction: MovementDirection,
    /// Positive base quantity.
    pub quantity: Decimal,
    /// Cost per base unit.
    pub unit_cost: Decimal,
}

impl StockChange {
    /// The change that undoes this one.
    #[must_use]
    pub fn inverse(self) -> Self {
        Self {
            direction: self.direction.inverse(),
            ..self
        }
    }

    /// Applies the change to `stock` and returns the movement to record.
    pub fn apply(
        &self,
        stock: &mut WarehouseProduct,
        source: &DocumentHeader,
        date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Result<InventoryMovement, InventoryError> {
        let balance_after = match self.direction {
            MovementDirection::In => stock.increase_stock(self.quantity)?,
            MovementDirection::Out => stock.decrease_stock(self.quantity)?,
        };
        Ok(InventoryMovement {
            id: MovementId::new(),
            warehouse_id: stock.warehouse_id,
            product_id: self.product_id,
            direction: self.direction,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            total_cost: round_quantity(self.quantity * self.unit_cost),
            date,
            source_number: source.number.clone(),
            source_type: source.kind.source_type(),
            balance_after,
            created_at,
        })
    }
}
