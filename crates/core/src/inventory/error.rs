//! Inventory error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::ProductId;
use thiserror::Error;

use crate::document::DocumentError;

/// Errors raised by stock changes and inventory adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Stock change of zero or less.
    #[error("Quantity must be greater than zero")]
    QuantityNotPositive,

    /// A decrease would take stock below zero.
    #[error("Insufficient stock for product {product_id}. Available: {available}, required: {required}")]
    InsufficientStock {
        /// Product short of stock.
        product_id: ProductId,
        /// Quantity on hand.
        available: Decimal,
        /// Quantity requested.
        required: Decimal,
    },

    /// Adjustment reason is blank.
    #[error("Adjustment reason is required")]
    ReasonRequired,

    /// Counted quantity below zero.
    #[error("Line {line}: actual quantity cannot be negative")]
    NegativeActualQuantity {
        /// Line number.
        line: u32,
    },

    /// Conversion factor of zero or less.
    #[error("Line {line}: conversion factor must be greater than zero")]
    InvalidConversionFactor {
        /// Line number.
        line: u32,
    },

    /// Unit cost below zero.
    #[error("Line {line}: unit cost cannot be negative")]
    NegativeUnitCost {
        /// Line number.
        line: u32,
    },

    /// A line's derived quantity or cost leaves the decimal range.
    #[error("Line {line}: quantity or cost is too large")]
    QuantityOverflow {
        /// Line number.
        line: u32,
    },

    /// Same product listed twice on one adjustment.
    #[error("Product {0} appears more than once on the adjustment")]
    DuplicateProduct(ProductId),

    /// Post attempted on an adjustment without lines.
    #[error("Adjustment has no lines")]
    NoLines,

    /// Line lookup by number failed.
    #[error("Adjustment line {0} not found")]
    LineNotFound(u32),

    /// Lifecycle violation.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl InventoryError {
    /// Returns the error code for logs and API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::QuantityNotPositive => "QUANTITY_NOT_POSITIVE",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::NegativeActualQuantity { .. } => "NEGATIVE_ACTUAL_QUANTITY",
            Self::InvalidConversionFactor { .. } => "INVALID_CONVERSION_FACTOR",
            Self::NegativeUnitCost { .. } => "NEGATIVE_UNIT_COST",
            Self::QuantityOverflow { .. } => "QUANTITY_OVERFLOW",
            Self::DuplicateProduct(_) => "DUPLICATE_PRODUCT",
            Self::NoLines => "NO_LINES",
            Self::LineNotFound(_) => "LINE_NOT_FOUND",
            Self::Document(inner) => inner.error_code(),
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Document(inner) => inner.into(),
            InventoryError::InsufficientStock { .. } => Self::InvariantViolation(err.to_string()),
            InventoryError::LineNotFound(_) => Self::NotFound(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
