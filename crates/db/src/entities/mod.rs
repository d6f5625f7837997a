//! `SeaORM` entity definitions, one module per table.
//!
//! Amounts and quantities are `TEXT` columns holding the decimal's string
//! form, so the stored scale survives every backend.

#![allow(missing_docs)]

pub mod accounts;
pub mod adjustment_lines;
pub mod cash_payments;
pub mod cash_receipts;
pub mod cash_transfers;
pub mod cashboxes;
pub mod document_sequences;
pub mod fiscal_periods;
pub mod fiscal_years;
pub mod inventory_adjustments;
pub mod inventory_movements;
pub mod invoices;
pub mod journal_entries;
pub mod journal_lines;
pub mod journal_sequences;
pub mod sea_orm_active_enums;
pub mod warehouse_products;
