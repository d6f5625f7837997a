//! Shared setup for service tests.
//!
//! Builds an in-memory SQLite store with a small chart of accounts, an active 2026 fiscal
//! year, two cashboxes and one warehouse, and pins "today" to 2026-03-20.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use tally_core::fiscal::FiscalYear;
use tally_core::inventory::WarehouseProduct;
use tally_core::ledger::Account;
use tally_core::settlement::{Invoice, InvoiceKind};
use tally_core::treasury::{CashReceipt, CashVoucherInput, Cashbox};
use tally_db::{AccountRepository, Database, InvoiceRepository, JournalRepository, StockRepository};
use tally_services::{CurrentUser, ServiceContext, Services, UserRole};
use tally_shared::types::{AccountId, InvoiceId, ProductId, WarehouseId};
use tally_shared::{AppConfig, FixedClock};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn today() -> NaiveDate {
    date(2026, 3, 20)
}

/// Chart of accounts used by the tests.
pub struct Chart {
    pub main_cash: AccountId,
    pub safe_cash: AccountId,
    pub capital: AccountId,
    pub suppliers: AccountId,
    pub customers: AccountId,
    pub office_expense: AccountId,
    pub inventory: AccountId,
    pub adjustment_income: AccountId,
    pub adjustment_expense: AccountId,
    pub assets: AccountId,
}

pub struct TestLedger {
    pub db: Database,
    pub services: Services,
    pub admin: CurrentUser,
    pub chart: Chart,
    pub year: FiscalYear,
    pub main: Cashbox,
    pub safe: Cashbox,
    pub warehouse: WarehouseId,
}

impl TestLedger {
    pub async fn new() -> Self {
        let db = Database::in_memory().await.unwrap();
        let ctx = ServiceContext::new(
            db.clone(),
            Arc::new(FixedClock::on(today())),
            AppConfig::default(),
        );
        let services = Services::new(&ctx);
        let admin = CurrentUser::new("alice", UserRole::Admin);

        let accounts = [
            Account::leaf("1111", "Main cash"),
            Account::leaf("1112", "Safe"),
            Account::leaf("3100", "Capital"),
            Account::leaf("2110", "Suppliers"),
            Account::leaf("1120", "Customers"),
            Account::leaf("5200", "Office expense"),
            Account::leaf("1131", "Inventory"),
            Account::leaf("4112", "Inventory adjustment income"),
            Account::leaf("5112", "Inventory adjustment expense"),
            Account::parent("1000", "Assets"),
        ];
        let chart = Chart {
            main_cash: accounts[0].id,
            safe_cash: accounts[1].id,
            capital: accounts[2].id,
            suppliers: accounts[3].id,
            customers: accounts[4].id,
            office_expense: accounts[5].id,
            inventory: accounts[6].id,
            adjustment_income: accounts[7].id,
            adjustment_expense: accounts[8].id,
            assets: accounts[9].id,
        };
        let txn = db.begin().await.unwrap();
        for account in accounts {
            AccountRepository::insert(&txn, account).await.unwrap();
        }
        Database::commit(txn).await.unwrap();

        let year = services.fiscal.create_year(&admin, 2026).await.unwrap();
        let year = services.fiscal.activate(&admin, year.id).await.unwrap();

        let main = services
            .cashboxes
            .create(&admin, "MAIN", "Main cashbox", chart.main_cash)
            .await
            .unwrap();
        let safe = services
            .cashboxes
            .create(&admin, "SAFE", "Office safe", chart.safe_cash)
            .await
            .unwrap();

        Self {
            db,
            services,
            admin,
            chart,
            year,
            main,
            safe,
            warehouse: WarehouseId::new(),
        }
    }

    /// Voucher input against `cashbox`, dated today.
    pub fn voucher(&self, cashbox: &Cashbox, contra: AccountId, amount: Decimal) -> CashVoucherInput {
        CashVoucherInput {
            date: today(),
            cashbox_id: cashbox.id,
            contra_account_id: contra,
            amount,
            description: "Test voucher".to_string(),
            notes: None,
            counterparty: None,
            invoice_id: None,
        }
    }

    /// Posts a capital contribution into `cashbox`.
    pub async fn fund(&self, cashbox: &Cashbox, amount: Decimal) -> CashReceipt {
        let input = self.voucher(cashbox, self.chart.capital, amount);
        let receipt = self.services.cash_receipts.create(&self.admin, input).await.unwrap();
        self.services
            .cash_receipts
            .post(&self.admin, receipt.id)
            .await
            .unwrap()
    }

    pub async fn cash_balance(&self, cashbox: &Cashbox) -> Decimal {
        self.services
            .cashboxes
            .balance(&self.admin, cashbox.id)
            .await
            .unwrap()
    }

    pub async fn account_balance(&self, account_id: AccountId) -> Decimal {
        self.services
            .journal
            .account_balance(&self.admin, account_id)
            .await
            .unwrap()
            .debit_balance()
    }

    pub async fn journal_count(&self) -> u64 {
        JournalRepository::count(self.db.connection()).await.unwrap()
    }

    /// Stores a posted, unpaid invoice.
    pub async fn invoice(&self, kind: InvoiceKind, total: Decimal) -> InvoiceId {
        let invoice = Invoice::posted(format!("INV-{}", InvoiceId::new()), kind, total);
        let id = invoice.id;
        InvoiceRepository::insert(self.db.connection(), invoice).await.unwrap();
        id
    }

    pub async fn load_invoice(&self, id: InvoiceId) -> Invoice {
        InvoiceRepository::find_by_id(self.db.connection(), id)
            .await
            .unwrap()
            .unwrap()
    }

    /// Sets the on-hand quantity of `product` in the test warehouse.
    pub async fn stock(&self, product: ProductId, quantity: Decimal) {
        let stock = WarehouseProduct {
            quantity,
            ..WarehouseProduct::new(self.warehouse, product)
        };
        StockRepository::save(self.db.connection(), stock).await.unwrap();
    }

    /// Makes every later write fail inside SQLite.
    pub async fn set_read_only(&self, on: bool) {
        let pragma = if on { "PRAGMA query_only = ON" } else { "PRAGMA query_only = OFF" };
        self.db.connection().execute_unprepared(pragma).await.unwrap();
    }

    pub async fn stock_level(&self, product: ProductId) -> Decimal {
        self.services
            .adjustments
            .stock_level(&self.admin, self.warehouse, product)
            .await
            .unwrap()
    }
}
