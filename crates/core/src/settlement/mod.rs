//! Invoice settlement: paid amount and balance due.

pub mod error;
pub mod invoice;

pub use error::SettlementError;
pub use invoice::{Invoice, InvoiceKind, InvoiceStatus, PaymentStatus};
