//! Conversions between domain values and their column forms.

use rust_decimal::Decimal;

use crate::error::StoreError;

/// Parses a decimal stored as text. The stored scale is kept.
pub(crate) fn decimal(column: &'static str, value: &str) -> Result<Decimal, StoreError> {
    value.parse().map_err(|_| StoreError::Corrupt {
        column,
        value: value.to_string(),
    })
}

/// Reads a non-negative integer column.
pub(crate) fn unsigned(column: &'static str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt {
        column,
        value: value.to_string(),
    })
}

/// Writes a small unsigned value into an integer column.
pub(crate) fn signed(column: &'static str, value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::Constraint(format!("{column} out of range: {value}")))
}

/// Reads a sequence counter.
pub(crate) fn counter(column: &'static str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt {
        column,
        value: value.to_string(),
    })
}
