//! Demo seeder for Tally.
//!
//! Connects to the configured database (in-memory SQLite by default), seeds
//! a chart of accounts, an active fiscal year, two cashboxes and some stock,
//! then posts and cancels one document of each kind and reverses one manual
//! journal entry, logging balances along the way.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tally_core::inventory::{AdjustmentLineInput, InventoryAdjustmentInput, WarehouseProduct};
use tally_core::ledger::Account;
use tally_core::settlement::{Invoice, InvoiceKind};
use tally_core::treasury::{CashTransferInput, CashVoucherInput, Cashbox};
use tally_db::{AccountRepository, Database, InvoiceRepository, StockRepository};
use tally_services::journal::{JournalLineInput, ManualJournalInput};
use tally_services::{CurrentUser, ServiceContext, Services, UserRole};
use tally_shared::types::{AccountId, ProductId, UnitId, WarehouseId};
use tally_shared::{AppConfig, SystemClock};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Ledger accounts the demo books against.
struct Chart {
    cash: AccountId,
    bank: AccountId,
    capital: AccountId,
    customers: AccountId,
    suppliers: AccountId,
    rent: AccountId,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config);

    let db = Database::connect(&config.database)
        .await
        .context("Failed to open the database")?;
    let ctx = ServiceContext::new(db.clone(), Arc::new(SystemClock), config);
    let services = Services::new(&ctx);
    let admin = CurrentUser::new(ctx.config.posting.system_user.clone(), UserRole::Admin);
    info!(
        registry = %serde_json::to_string(&services.registry)?,
        "Services ready"
    );

    let chart = seed_accounts(&db, &ctx.config).await?;

    let today = ctx.clock.today();
    let year = services
        .fiscal
        .create_year(&admin, today.year())
        .await?;
    services.fiscal.activate(&admin, year.id).await?;

    let main = services.cashboxes.create(&admin, "MAIN", "Main cashbox", chart.cash).await?;
    let bank = services.cashboxes.create(&admin, "BANK", "Bank deposit box", chart.bank).await?;

    run_treasury(&services, &admin, &db, &chart, (&main, &bank), today).await?;
    run_inventory(&services, &admin, &db, today).await?;
    run_journal(&services, &admin, &chart, today).await?;

    info!("Demo complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_env("TALLY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| config.logging.filter.clone().into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn seed_accounts(db: &Database, config: &AppConfig) -> anyhow::Result<Chart> {
    let accounts = vec![
        Account::leaf("1111", "Main cash"),
        Account::leaf("1112", "Bank deposit box"),
        Account::leaf("3100", "Owner capital"),
        Account::leaf("1120", "Customers"),
        Account::leaf("2110", "Suppliers"),
        Account::leaf("5210", "Rent"),
        Account::leaf(config.accounts.inventory.clone(), "Inventory"),
        Account::leaf(config.accounts.adjustment_income.clone(), "Inventory adjustment income"),
        Account::leaf(config.accounts.adjustment_expense.clone(), "Inventory adjustment expense"),
        Account::parent("1000", "Assets"),
    ];
    let chart = Chart {
        cash: accounts[0].id,
        bank: accounts[1].id,
        capital: accounts[2].id,
        customers: accounts[3].id,
        suppliers: accounts[4].id,
        rent: accounts[5].id,
    };
    let count = accounts.len();

    let txn = db.begin().await?;
    for account in accounts {
        AccountRepository::insert(&txn, account).await?;
    }
    Database::commit(txn).await?;

    info!(count, "Accounts seeded");
    Ok(chart)
}

async fn run_treasury(
    services: &Services,
    admin: &CurrentUser,
    db: &Database,
    chart: &Chart,
    (main, bank): (&Cashbox, &Cashbox),
    today: NaiveDate,
) -> anyhow::Result<()> {
    let voucher = |contra: AccountId, amount: Decimal, description: &str| CashVoucherInput {
        date: today,
        cashbox_id: main.id,
        contra_account_id: contra,
        amount,
        description: description.to_string(),
        notes: None,
        counterparty: None,
        invoice_id: None,
    };

    let capital = services
        .cash_receipts
        .create(admin, voucher(chart.capital, Decimal::new(500_000, 2), "Opening capital"))
        .await?;
    services.cash_receipts.post(admin, capital.id).await?;

    let sale = Invoice::posted("SI-0001", InvoiceKind::Sales, Decimal::new(120_000, 2));
    let purchase = Invoice::posted("PI-0001", InvoiceKind::Purchase, Decimal::new(45_000, 2));
    let (sale_id, purchase_id) = (sale.id, purchase.id);
    let txn = db.begin().await?;
    InvoiceRepository::insert(&txn, sale).await?;
    InvoiceRepository::insert(&txn, purchase).await?;
    Database::commit(txn).await?;

    let mut input = voucher(chart.customers, Decimal::new(80_000, 2), "Customer settles SI-0001");
    input.invoice_id = Some(sale_id);
    let receipt = services.cash_receipts.create(admin, input).await?;
    services.cash_receipts.post(admin, receipt.id).await?;

    let mut input = voucher(chart.suppliers, Decimal::new(45_000, 2), "Pay supplier PI-0001");
    input.invoice_id = Some(purchase_id);
    let payment = services.cash_payments.create(admin, input).await?;
    services.cash_payments.post(admin, payment.id).await?;

    let rent = services
        .cash_payments
        .create(admin, voucher(chart.rent, Decimal::new(150_000, 2), "Office rent"))
        .await?;
    services.cash_payments.post(admin, rent.id).await?;

    let transfer = services
        .cash_transfers
        .create(
            admin,
            CashTransferInput {
                date: today,
                from_cashbox_id: main.id,
                to_cashbox_id: bank.id,
                amount: Decimal::new(200_000, 2),
                description: "Deposit takings".to_string(),
                notes: None,
            },
        )
        .await?;
    services.cash_transfers.post(admin, transfer.id).await?;

    info!(
        main = %services.cashboxes.balance(admin, main.id).await?,
        bank = %services.cashboxes.balance(admin, bank.id).await?,
        "Balances after posting"
    );

    services.cash_payments.cancel(admin, rent.id).await?;
    services.cash_receipts.cancel(admin, receipt.id).await?;
    services.cash_transfers.cancel(admin, transfer.id).await?;

    info!(
        main = %services.cashboxes.balance(admin, main.id).await?,
        bank = %services.cashboxes.balance(admin, bank.id).await?,
        "Balances after cancelling"
    );
    Ok(())
}

async fn run_inventory(
    services: &Services,
    admin: &CurrentUser,
    db: &Database,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let warehouse = WarehouseId::new();
    let (bolts, nuts) = (ProductId::new(), ProductId::new());

    let txn = db.begin().await?;
    for (product, quantity) in [(bolts, Decimal::from(10)), (nuts, Decimal::from(40))] {
        let stock = WarehouseProduct {
            quantity,
            ..WarehouseProduct::new(warehouse, product)
        };
        StockRepository::save(&txn, stock).await?;
    }
    Database::commit(txn).await?;

    let line = |product_id, system: i64, actual: i64, unit_cost| AdjustmentLineInput {
        product_id,
        unit_id: UnitId::new(),
        system_quantity: Decimal::from(system),
        actual_quantity: Decimal::from(actual),
        conversion_factor: Decimal::ONE,
        unit_cost,
        notes: None,
    };
    let adjustment = services
        .adjustments
        .create(
            admin,
            InventoryAdjustmentInput {
                date: today,
                warehouse_id: warehouse,
                reason: "Year-end count".to_string(),
                notes: None,
                lines: vec![
                    line(bolts, 10, 15, Decimal::new(400, 2)),
                    line(nuts, 40, 37, Decimal::new(25, 2)),
                ],
            },
        )
        .await?;
    let posted = services.adjustments.post(admin, adjustment.id).await?;

    info!(
        number = %posted.header.number,
        bolts = %services.adjustments.stock_level(admin, warehouse, bolts).await?,
        nuts = %services.adjustments.stock_level(admin, warehouse, nuts).await?,
        "Stock after adjustment"
    );

    services.adjustments.cancel(admin, adjustment.id).await?;
    info!(
        bolts = %services.adjustments.stock_level(admin, warehouse, bolts).await?,
        nuts = %services.adjustments.stock_level(admin, warehouse, nuts).await?,
        "Stock after cancelling"
    );
    Ok(())
}

async fn run_journal(
    services: &Services,
    admin: &CurrentUser,
    chart: &Chart,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let line = |account_id, debit, credit| JournalLineInput {
        account_id,
        debit,
        credit,
        memo: None,
    };
    let amount = Decimal::new(30_000, 2);
    let draft = services
        .journal
        .create_draft(
            admin,
            ManualJournalInput {
                journal_date: today,
                description: "Accrue next month's rent".to_string(),
                reference_number: None,
                lines: vec![
                    line(chart.rent, amount, Decimal::ZERO),
                    line(chart.suppliers, Decimal::ZERO, amount),
                ],
            },
        )
        .await?;
    let posted = services.journal.post(admin, draft.id).await?;
    let mirror = services
        .journal
        .reverse(admin, posted.id, "Accrued in the wrong month")
        .await?;

    info!(
        posted = ?posted.journal_number,
        reversal = ?mirror.journal_number,
        rent = %services.journal.account_balance(admin, chart.rent).await?.debit_balance(),
        "Manual journal reversed"
    );
    Ok(())
}
