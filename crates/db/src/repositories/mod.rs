//! Repository abstractions for data access.
//!
//! Repositories hide table layout from the services and map rows back to
//! domain aggregates. Every method takes the connection to run on, usually
//! the transaction of the caller's unit of work.

pub mod account;
pub mod cashbox;
pub mod document;
pub mod fiscal;
pub mod invoice;
pub mod journal;
pub mod sequence;
pub mod stock;

pub use account::AccountRepository;
pub use cashbox::CashboxRepository;
pub use document::{DocumentRepository, StoredDocument};
pub use fiscal::FiscalRepository;
pub use invoice::InvoiceRepository;
pub use journal::JournalRepository;
pub use sequence::SequenceRepository;
pub use stock::StockRepository;
