//! Application services for the posting engine.
//!
//! Each service wraps one aggregate's workflows:
//! - Cash payments, receipts and transfers ([`CashPaymentService`],
//!   [`CashReceiptService`], [`CashTransferService`])
//! - Inventory count adjustments ([`InventoryAdjustmentService`])
//! - Cashboxes, manual journal entries and the fiscal calendar
//!
//! Every post and cancel runs as one serializable unit of work: either the
//! journal entry, the balance changes and the status change all commit, or
//! none of them do.

pub mod auth;
pub mod cash_payment;
pub mod cash_receipt;
pub mod cash_transfer;
pub mod cashbox;
pub mod context;
pub mod fiscal;
pub mod inventory_adjustment;
pub mod journal;
pub mod registry;

mod documents;
mod posting;

pub use auth::{CurrentUser, Permission, UserRole};
pub use cash_payment::CashPaymentService;
pub use cash_receipt::CashReceiptService;
pub use cash_transfer::CashTransferService;
pub use cashbox::CashboxService;
pub use context::ServiceContext;
pub use fiscal::FiscalYearService;
pub use inventory_adjustment::InventoryAdjustmentService;
pub use journal::JournalService;
pub use registry::{ModuleService, ServiceRegistry, SystemModule};

/// Every service, wired to one context.
#[derive(Debug, Clone)]
pub struct Services {
    /// Cash payments.
    pub cash_payments: CashPaymentService,
    /// Cash receipts.
    pub cash_receipts: CashReceiptService,
    /// Cash transfers.
    pub cash_transfers: CashTransferService,
    /// Inventory adjustments.
    pub adjustments: InventoryAdjustmentService,
    /// Cashboxes.
    pub cashboxes: CashboxService,
    /// Manual journal entries and ledger queries.
    pub journal: JournalService,
    /// Fiscal calendar.
    pub fiscal: FiscalYearService,
    /// Module tags of the services above.
    pub registry: ServiceRegistry,
}

impl Services {
    /// Builds every service on `ctx` and registers its module.
    #[must_use]
    pub fn new(ctx: &ServiceContext) -> Self {
        let mut registry = ServiceRegistry::new();
        registry
            .register::<CashPaymentService>()
            .register::<CashReceiptService>()
            .register::<CashTransferService>()
            .register::<CashboxService>()
            .register::<InventoryAdjustmentService>()
            .register::<JournalService>()
            .register::<FiscalYearService>();
        tracing::debug!(services = registry.len(), "Services registered");

        Self {
            cash_payments: CashPaymentService::new(ctx.clone()),
            cash_receipts: CashReceiptService::new(ctx.clone()),
            cash_transfers: CashTransferService::new(ctx.clone()),
            adjustments: InventoryAdjustmentService::new(ctx.clone()),
            cashboxes: CashboxService::new(ctx.clone()),
            journal: JournalService::new(ctx.clone()),
            fiscal: FiscalYearService::new(ctx.clone()),
            registry,
        }
    }
}
