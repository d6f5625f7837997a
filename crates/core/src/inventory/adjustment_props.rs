//! Property-based tests for inventory adjustments.
//!
//! - Every posting plan balances and books the net cost difference
//! - Applying the stock changes then their inverses restores every level

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, ProductId, UnitId, WarehouseId};

use crate::inventory::adjustment::{
    AdjustmentAccounts, AdjustmentLineInput, InventoryAdjustment, InventoryAdjustmentInput,
};
use crate::inventory::stock::WarehouseProduct;

/// Quantities with up to two decimals.
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Conversion factors in (0, 100].
fn arb_factor() -> impl Strategy<Value = Decimal> {
    (1i64..10_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_line() -> impl Strategy<Value = AdjustmentLineInput> {
    (arb_quantity(), arb_quantity(), arb_factor(), arb_quantity()).prop_map(
        |(system_quantity, actual_quantity, conversion_factor, unit_cost)| AdjustmentLineInput {
            product_id: ProductId::new(),
            unit_id: UnitId::new(),
            system_quantity,
            actual_quantity,
            conversion_factor,
            unit_cost,
            notes: None,
        },
    )
}

fn adjustment(lines: Vec<AdjustmentLineInput>) -> InventoryAdjustment {
    InventoryAdjustment::create(
        "ADJ-202607-0001".to_string(),
        InventoryAdjustmentInput {
            date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            warehouse_id: WarehouseId::new(),
            reason: "Generated count".to_string(),
            notes: None,
            lines,
        },
        "prop",
        Utc::now(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn prop_plan_balances_and_nets_cost(lines in prop::collection::vec(arb_line(), 1..8)) {
        let adj = adjustment(lines);
        let accounts = AdjustmentAccounts {
            inventory: AccountId::new(),
            income: AccountId::new(),
            expense: AccountId::new(),
        };

        let plan = adj.posting_plan(&accounts).unwrap();
        prop_assert_eq!(plan.total_debit(), plan.total_credit());

        let inventory_net: Decimal = plan
            .lines
            .iter()
            .filter(|l| l.account_id == accounts.inventory)
            .map(|l| l.debit - l.credit)
            .sum();
        let cost_net: Decimal = adj.lines().iter().map(|l| l.cost_difference).sum();
        prop_assert_eq!(inventory_net, cost_net);
    }

    #[test]
    fn prop_inverse_changes_restore_stock(lines in prop::collection::vec(arb_line(), 1..8)) {
        let adj = adjustment(lines);
        let now = Utc::now();

        for change in adj.stock_changes() {
            let mut stock = WarehouseProduct::new(adj.warehouse_id, change.product_id);
            stock.quantity = Decimal::from(10_000_000);
            let before = stock.quantity;

            change.apply(&mut stock, &adj.header, adj.header.date, now).unwrap();
            change.inverse().apply(&mut stock, &adj.header, adj.header.date, now).unwrap();

            prop_assert_eq!(stock.quantity, before);
        }
    }
}
