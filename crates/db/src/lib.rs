//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions and the schema migration
//! - [`Database`], a connection pool whose units of work are serializable
//!   transactions
//! - Repositories, one per aggregate
//!
//! Repositories are stateless and take any [`sea_orm::ConnectionTrait`]: the
//! transaction of a unit of work for reads and writes that must see the same
//! snapshot, or the plain connection for one-off reads.

mod columns;
pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use repositories::{
    AccountRepository, CashboxRepository, DocumentRepository, FiscalRepository,
    InvoiceRepository, JournalRepository, SequenceRepository, StockRepository, StoredDocument,
};
pub use sea_orm::{DatabaseConnection, DatabaseTransaction};
pub use store::Database;
