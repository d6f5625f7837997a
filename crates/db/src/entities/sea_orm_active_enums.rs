//! Status and type columns, stored as lowercase text.
//!
//! Each enum mirrors a domain enum one-to-one and converts both ways.

use sea_orm::entity::prelude::*;
use tally_core::document::DocumentStatus as CoreDocumentStatus;
use tally_core::fiscal::{
    FiscalYearStatus as CoreFiscalYearStatus, PeriodStatus as CorePeriodStatus,
};
use tally_core::inventory::MovementDirection as CoreMovementDirection;
use tally_core::ledger::{JournalStatus as CoreJournalStatus, SourceType as CoreSourceType};
use tally_core::settlement::{
    InvoiceKind as CoreInvoiceKind, InvoiceStatus as CoreInvoiceStatus,
    PaymentStatus as CorePaymentStatus,
};

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident <=> $core:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
        #[sea_orm(rs_type = "String", db_type = "Text")]
        pub enum $name {
            $(
                #[sea_orm(string_value = $value)]
                $variant,
            )+
        }

        impl From<$core> for $name {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$name> for $core {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => Self::$variant,)+
                }
            }
        }
    };
}

text_enum! {
    /// Document lifecycle status.
    DocumentStatus <=> CoreDocumentStatus {
        Draft = "draft",
        Posted = "posted",
        Cancelled = "cancelled",
    }
}

text_enum! {
    /// Journal entry status.
    JournalStatus <=> CoreJournalStatus {
        Draft = "draft",
        Posted = "posted",
    }
}

text_enum! {
    /// Document type that originated a journal entry or movement.
    SourceType <=> CoreSourceType {
        Manual = "manual",
        Opening = "opening",
        CashPayment = "cash_payment",
        CashReceipt = "cash_receipt",
        CashTransfer = "cash_transfer",
        Adjustment = "adjustment",
    }
}

text_enum! {
    /// Fiscal year status.
    FiscalYearStatus <=> CoreFiscalYearStatus {
        Setup = "setup",
        Active = "active",
        Closed = "closed",
    }
}

text_enum! {
    /// Fiscal period status.
    PeriodStatus <=> CorePeriodStatus {
        Open = "open",
        Closed = "closed",
    }
}

text_enum! {
    /// Sales or purchase invoice.
    InvoiceKind <=> CoreInvoiceKind {
        Sales = "sales",
        Purchase = "purchase",
    }
}

text_enum! {
    /// Invoice status.
    InvoiceStatus <=> CoreInvoiceStatus {
        Draft = "draft",
        Posted = "posted",
        Cancelled = "cancelled",
    }
}

text_enum! {
    /// Invoice settlement status.
    PaymentStatus <=> CorePaymentStatus {
        Unpaid = "unpaid",
        PartiallyPaid = "partially_paid",
        Paid = "paid",
    }
}

text_enum! {
    /// Stock movement direction.
    MovementDirection <=> CoreMovementDirection {
        In = "in",
        Out = "out",
    }
}
