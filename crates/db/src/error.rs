//! Store error type.

use sea_orm::DbErr;
use tally_shared::AppError;
use thiserror::Error;

/// Errors raised by the store itself, never by business rules.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database driver failed.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Update of a row that does not exist.
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Insert of a key that already exists.
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Write violating a table constraint.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// A stored value does not map back to the domain.
    #[error("Column {column} holds an unreadable value: {value}")]
    Corrupt {
        /// Column name.
        column: &'static str,
        /// Stored text.
        value: String,
    },
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Infrastructure(err.to_string())
    }
}
