//! Inventory: warehouse stock levels, movements and count adjustments.

pub mod adjustment;
pub mod error;
pub mod stock;

#[cfg(test)]
mod adjustment_props;

pub use adjustment::{
    AdjustmentAccounts, AdjustmentLine, AdjustmentLineInput, InventoryAdjustment,
    InventoryAdjustmentInput,
};
pub use error::InventoryError;
pub use stock::{InventoryMovement, MovementDirection, StockChange, WarehouseProduct};
