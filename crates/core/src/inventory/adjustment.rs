//! Inventory adjustments: booking the gap between counted and recorded stock.
//!
//! Each line derives, at four decimals:
//!
//! - `difference_quantity = actual - system`
//! - `difference_base = difference_quantity × conversion_factor`
//! - `cost_difference = difference_base × unit_cost`
//!
//! Positive differences are surpluses (DR inventory, CR adjustment income),
//! negative ones shortages (DR adjustment expense, CR inventory). Both
//! pairs can appear in one entry.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{
    AccountId, InventoryAdjustmentId, ProductId, UnitId, WarehouseId, round_quantity,
};
use uuid::Uuid;

use super::error::InventoryError;
use super::stock::{MovementDirection, StockChange};
use crate::document::{Document, DocumentHeader, DocumentKind};
use crate::ledger::{PlannedLine, PostingPlan};

/// Ledger accounts an adjustment posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentAccounts {
    /// Inventory asset.
    pub inventory: AccountId,
    /// Credited by surpluses.
    pub income: AccountId,
    /// Debited by shortages.
    pub expense: AccountId,
}

/// One counted product, as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLineInput {
    /// Product counted.
    pub product_id: ProductId,
    /// Unit the count was made in.
    pub unit_id: UnitId,
    /// Quantity on record, in `unit_id`.
    pub system_quantity: Decimal,
    /// Quantity counted, in `unit_id`.
    pub actual_quantity: Decimal,
    /// Base units per `unit_id`.
    pub conversion_factor: Decimal,
    /// Cost per base unit.
    pub unit_cost: Decimal,
    /// Line notes.
    pub notes: Option<String>,
}

/// A validated adjustment line with its derived differences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    /// 1-based position.
    pub line_number: u32,
    /// Product counted.
    pub product_id: ProductId,
    /// Unit the count was made in.
    pub unit_id: UnitId,
    /// Quantity on record.
    pub system_quantity: Decimal,
    /// Quantity counted.
    pub actual_quantity: Decimal,
    /// Base units per unit.
    pub conversion_factor: Decimal,
    /// Cost per base unit.
    pub unit_cost: Decimal,
    /// `actual - system`.
    pub difference_quantity: Decimal,
    /// Difference in base units.
    pub difference_base: Decimal,
    /// Signed cost of the difference.
    pub cost_difference: Decimal,
    /// Line notes.
    pub notes: Option<String>,
}

impl AdjustmentLine {
    fn from_input(line_number: u32, input: AdjustmentLineInput) -> Result<Self, InventoryError> {
        if input.actual_quantity < Decimal::ZERO {
            return Err(InventoryError::NegativeActualQuantity { line: line_number });
        }
        if input.conversion_factor <= Decimal::ZERO {
            return Err(InventoryError::InvalidConversionFactor { line: line_number });
        }
        if input.unit_cost < Decimal::ZERO {
            return Err(InventoryError::NegativeUnitCost { line: line_number });
        }

        let overflow = InventoryError::QuantityOverflow { line: line_number };
        let difference_quantity = input
            .actual_quantity
            .checked_sub(input.system_quantity)
            .ok_or(overflow.clone())?;
        let difference_base = difference_quantity
            .checked_mul(input.conversion_factor)
            .map(round_quantity)
            .ok_or(overflow.clone())?;
        let cost_difference = difference_base
            .checked_mul(input.unit_cost)
            .map(round_quantity)
            .ok_or(overflow)?;

        Ok(Self {
            line_number,
            product_id: input.product_id,
            unit_id: input.unit_id,
            system_quantity: input.system_quantity,
            actual_quantity: input.actual_quantity,
            conversion_factor: input.conversion_factor,
            unit_cost: input.unit_cost,
            difference_quantity,
            difference_base,
            cost_difference,
            notes: input.notes,
        })
    }

    /// Counted more than recorded.
    #[must_use]
    pub fn is_surplus(&self) -> bool {
        self.difference_base > Decimal::ZERO
    }

    /// Counted less than recorded.
    #[must_use]
    pub fn is_shortage(&self) -> bool {
        self.difference_base < Decimal::ZERO
    }

    /// Stock change this line books, if any.
    #[must_use]
    pub fn stock_change(&self) -> Option<StockChange> {
        let direction = if self.is_surplus() {
            MovementDirection::In
        } else if self.is_shortage() {
            MovementDirection::Out
        } else {
            return None;
        };
        Some(StockChange {
            product_id: self.product_id,
            direction,
            quantity: self.difference_base.abs(),
            unit_cost: self.unit_cost,
        })
    }
}

/// Create or update input for an adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryAdjustmentInput {
    /// Count date.
    pub date: NaiveDate,
    /// Warehouse counted.
    pub warehouse_id: WarehouseId,
    /// Why the count differs.
    pub reason: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Counted products.
    pub lines: Vec<AdjustmentLineInput>,
}

/// An inventory count adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryAdjustment {
    /// Unique identifier.
    pub id: InventoryAdjustmentId,
    /// Number, date, status and audit fields.
    pub header: DocumentHeader,
    /// Warehouse counted.
    pub warehouse_id: WarehouseId,
    /// Why the count differs.
    pub reason: String,
    /// Free-form notes.
    pub notes: Option<String>,
    lines: Vec<AdjustmentLine>,
}

fn checked_reason(reason: &str) -> Result<String, InventoryError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(InventoryError::ReasonRequired);
    }
    Ok(reason.to_string())
}

fn build_lines(inputs: Vec<AdjustmentLineInput>) -> Result<Vec<AdjustmentLine>, InventoryError> {
    let mut seen = HashSet::new();
    let mut lines = Vec::with_capacity(inputs.len());
    for (number, input) in (1u32..).zip(inputs) {
        if !seen.insert(input.product_id) {
            return Err(InventoryError::DuplicateProduct(input.product_id));
        }
        lines.push(AdjustmentLine::from_input(number, input)?);
    }
    check_totals(&lines)?;
    Ok(lines)
}

/// Sums the magnitude of every cost difference `keep` accepts.
fn cost_total(
    lines: &[AdjustmentLine],
    keep: impl Fn(Decimal) -> bool,
) -> Result<Decimal, InventoryError> {
    lines
        .iter()
        .filter(|l| keep(l.cost_difference))
        .try_fold(Decimal::ZERO, |total, l| {
            total
                .checked_add(l.cost_difference.abs())
                .ok_or(InventoryError::QuantityOverflow { line: l.line_number })
        })
}

fn check_totals(lines: &[AdjustmentLine]) -> Result<(), InventoryError> {
    cost_total(lines, |c| c > Decimal::ZERO)?;
    cost_total(lines, |c| c < Decimal::ZERO)?;
    Ok(())
}

impl InventoryAdjustment {
    /// Creates a draft adjustment numbered `number`.
    pub fn create(
        number: String,
        input: InventoryAdjustmentInput,
        created_by: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, InventoryError> {
        let reason = checked_reason(&input.reason)?;
        let lines = build_lines(input.lines)?;
        Ok(Self {
            id: InventoryAdjustmentId::new(),
            header: DocumentHeader::draft(
                DocumentKind::InventoryAdjustment,
                number,
                input.date,
                created_by,
                created_at,
            ),
            warehouse_id: input.warehouse_id,
            reason,
            notes: input.notes,
            lines,
        })
    }

    /// Rebuilds an adjustment read back from storage.
    #[must_use]
    pub fn restore(
        id: InventoryAdjustmentId,
        header: DocumentHeader,
        warehouse_id: WarehouseId,
        reason: String,
        notes: Option<String>,
        lines: Vec<AdjustmentLine>,
    ) -> Self {
        Self {
            id,
            header,
            warehouse_id,
            reason,
            notes,
            lines,
        }
    }

    /// Replaces the header fields and the whole line set of a draft.
    pub fn update(&mut self, input: InventoryAdjustmentInput) -> Result<(), InventoryError> {
        self.header.ensure_editable()?;
        let reason = checked_reason(&input.reason)?;
        let lines = build_lines(input.lines)?;

        self.header.date = input.date;
        self.warehouse_id = input.warehouse_id;
        self.reason = reason;
        self.notes = input.notes;
        self.lines = lines;
        Ok(())
    }

    /// Appends a line to a draft and returns its number.
    pub fn add_line(&mut self, input: AdjustmentLineInput) -> Result<u32, InventoryError> {
        self.header.ensure_editable()?;
        if self.lines.iter().any(|l| l.product_id == input.product_id) {
            return Err(InventoryError::DuplicateProduct(input.product_id));
        }
        let number = u32::try_from(self.lines.len()).map_or(u32::MAX, |n| n + 1);
        self.lines.push(AdjustmentLine::from_input(number, input)?);
        if let Err(err) = check_totals(&self.lines) {
            self.lines.pop();
            return Err(err);
        }
        Ok(number)
    }

    /// Removes a line from a draft and renumbers the rest.
    pub fn remove_line(&mut self, line_number: u32) -> Result<(), InventoryError> {
        self.header.ensure_editable()?;
        let index = self
            .lines
            .iter()
            .position(|l| l.line_number == line_number)
            .ok_or(InventoryError::LineNotFound(line_number))?;
        self.lines.remove(index);
        for (number, line) in (1u32..).zip(self.lines.iter_mut()) {
            line.line_number = number;
        }
        Ok(())
    }

    /// Lines in order.
    #[must_use]
    pub fn lines(&self) -> &[AdjustmentLine] {
        &self.lines
    }

    /// Fails when there is nothing to post.
    pub fn ensure_has_lines(&self) -> Result<(), InventoryError> {
        if self.lines.is_empty() {
            Err(InventoryError::NoLines)
        } else {
            Ok(())
        }
    }

    /// Sum of positive cost differences.
    pub fn surplus_total(&self) -> Result<Decimal, InventoryError> {
        cost_total(&self.lines, |c| c > Decimal::ZERO)
    }

    /// Sum of negative cost differences, as a positive amount.
    pub fn shortage_total(&self) -> Result<Decimal, InventoryError> {
        cost_total(&self.lines, |c| c < Decimal::ZERO)
    }

    /// Stock changes for every line with a nonzero base difference.
    #[must_use]
    pub fn stock_changes(&self) -> Vec<StockChange> {
        self.lines
            .iter()
            .filter_map(AdjustmentLine::stock_change)
            .collect()
    }

    /// Journal lines for the cost differences.
    ///
    /// The plan is empty when every line nets to zero cost.
    pub fn posting_plan(&self, accounts: &AdjustmentAccounts) -> Result<PostingPlan, InventoryError> {
        let mut lines = Vec::new();
        let surplus = self.surplus_total()?;
        if surplus > Decimal::ZERO {
            lines.push(PlannedLine::debit(accounts.inventory, surplus, "Inventory surplus"));
            lines.push(PlannedLine::credit(accounts.income, surplus, "Inventory surplus"));
        }
        let shortage = self.shortage_total()?;
        if shortage > Decimal::ZERO {
            lines.push(PlannedLine::debit(accounts.expense, shortage, "Inventory shortage"));
            lines.push(PlannedLine::credit(accounts.inventory, shortage, "Inventory shortage"));
        }

        Ok(PostingPlan {
            date: self.header.date,
            description: format!("{} {}: {}", self.header.kind, self.header.number, self.reason),
            source_type: self.header.kind.source_type(),
            reference_number: self.header.number.clone(),
            source_id: self.id.into_inner(),
            lines,
        })
    }
}

impl Document for InventoryAdjustment {
    const KIND: DocumentKind = DocumentKind::InventoryAdjustment;

    fn source_id(&self) -> Uuid {
        self.id.into_inner()
    }

    fn header(&self) -> &DocumentHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut DocumentHeader {
        &mut self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_shared::AppError;

    fn line(
        system: Decimal,
        actual: Decimal,
        factor: Decimal,
        cost: Decimal,
    ) -> AdjustmentLineInput {
        AdjustmentLineInput {
            product_id: ProductId::new(),
            unit_id: UnitId::new(),
            system_quantity: system,
            actual_quantity: actual,
            conversion_factor: factor,
            unit_cost: cost,
            notes: None,
        }
    }

    fn input(lines: Vec<AdjustmentLineInput>) -> InventoryAdjustmentInput {
        InventoryAdjustmentInput {
            date: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
            warehouse_id: WarehouseId::new(),
            reason: "Quarterly count".to_string(),
            notes: None,
            lines,
        }
    }

    fn accounts() -> AdjustmentAccounts {
        AdjustmentAccounts {
            inventory: AccountId::new(),
            income: AccountId::new(),
            expense: AccountId::new(),
        }
    }

    fn create(lines: Vec<AdjustmentLineInput>) -> InventoryAdjustment {
        InventoryAdjustment::create("ADJ-202603-0001".to_string(), input(lines), "erin", Utc::now())
            .unwrap()
    }

    #[test]
    fn test_surplus_line_books_inventory_against_income() {
        let adj = create(vec![line(dec!(10), dec!(15), dec!(1), dec!(4.00))]);
        let accounts = accounts();

        let l = &adj.lines()[0];
        assert_eq!(l.difference_quantity, dec!(5));
        assert_eq!(l.difference_base, dec!(5));
        assert_eq!(l.cost_difference, dec!(20.00));

        let plan = adj.posting_plan(&accounts).unwrap();
        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].account_id, accounts.inventory);
        assert_eq!(plan.lines[0].debit, dec!(20.00));
        assert_eq!(plan.lines[1].account_id, accounts.income);
        assert_eq!(plan.lines[1].credit, dec!(20.00));

        let changes = adj.stock_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].direction, MovementDirection::In);
        assert_eq!(changes[0].quantity, dec!(5));
    }

    #[test]
    fn test_mixed_lines_book_both_pairs() {
        let adj = create(vec![
            line(dec!(10), dec!(12), dec!(1), dec!(3)),
            line(dec!(4), dec!(3), dec!(12), dec!(0.5)),
        ]);
        let accounts = accounts();

        assert_eq!(adj.surplus_total().unwrap(), dec!(6));
        assert_eq!(adj.shortage_total().unwrap(), dec!(6.0));

        let plan = adj.posting_plan(&accounts).unwrap();
        assert_eq!(plan.lines.len(), 4);
        assert_eq!(plan.lines[2].account_id, accounts.expense);
        assert_eq!(plan.lines[3].account_id, accounts.inventory);
        assert_eq!(plan.total_debit(), plan.total_credit());
        assert_eq!(adj.stock_changes()[1].quantity, dec!(12));
    }

    #[test]
    fn test_zero_cost_adjustment_has_empty_plan() {
        let adj = create(vec![
            line(dec!(5), dec!(5), dec!(1), dec!(9)),
            line(dec!(5), dec!(7), dec!(1), dec!(0)),
        ]);
        assert!(adj.posting_plan(&accounts()).unwrap().is_empty());
        assert_eq!(adj.stock_changes().len(), 1);
    }

    #[test]
    fn test_conversion_rounds_to_four_places() {
        let adj = create(vec![line(dec!(0), dec!(1), dec!(0.33333), dec!(3))]);
        let l = &adj.lines()[0];
        assert_eq!(l.difference_base, dec!(0.3333));
        assert_eq!(l.cost_difference, dec!(0.9999));
    }

    #[test]
    fn test_line_rules() {
        let mut dup = line(dec!(1), dec!(2), dec!(1), dec!(1));
        let first = dup.clone();
        dup.system_quantity = dec!(3);
        let err = InventoryAdjustment::create("A".to_string(), input(vec![first, dup]), "e", Utc::now())
            .unwrap_err();
        assert!(matches!(err, InventoryError::DuplicateProduct(_)));

        let err = InventoryAdjustment::create(
            "A".to_string(),
            input(vec![line(dec!(1), dec!(-1), dec!(1), dec!(1))]),
            "e",
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, InventoryError::NegativeActualQuantity { line: 1 });

        let err = InventoryAdjustment::create(
            "A".to_string(),
            input(vec![line(dec!(1), dec!(1), dec!(1), dec!(1)), line(dec!(1), dec!(1), dec!(0), dec!(1))]),
            "e",
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, InventoryError::InvalidConversionFactor { line: 2 });
    }

    #[test]
    fn test_line_overflow_rejected() {
        let err = InventoryAdjustment::create(
            "A".to_string(),
            input(vec![line(dec!(0), Decimal::MAX, Decimal::TWO, dec!(1))]),
            "e",
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, InventoryError::QuantityOverflow { line: 1 });
        assert!(matches!(AppError::from(err), AppError::Validation(_)));

        let err = InventoryAdjustment::create(
            "A".to_string(),
            input(vec![line(Decimal::MIN, Decimal::MAX, dec!(1), dec!(1))]),
            "e",
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, InventoryError::QuantityOverflow { line: 1 });
    }

    #[test]
    fn test_cost_total_overflow_rejected() {
        let big = line(dec!(0), Decimal::MAX, dec!(1), dec!(1));
        let mut adj = create(vec![big]);

        let err = adj.add_line(line(dec!(0), Decimal::MAX, dec!(1), dec!(1))).unwrap_err();
        assert_eq!(err, InventoryError::QuantityOverflow { line: 2 });
        assert_eq!(adj.lines().len(), 1);
        assert_eq!(adj.surplus_total().unwrap(), Decimal::MAX);
    }

    #[test]
    fn test_reason_required() {
        let mut bad = input(vec![]);
        bad.reason = " ".to_string();
        assert_eq!(
            InventoryAdjustment::create("A".to_string(), bad, "e", Utc::now()).unwrap_err(),
            InventoryError::ReasonRequired
        );
    }

    #[test]
    fn test_empty_adjustment_cannot_post() {
        let adj = create(vec![]);
        assert_eq!(adj.ensure_has_lines(), Err(InventoryError::NoLines));
    }

    #[test]
    fn test_add_and_remove_lines() {
        let mut adj = create(vec![line(dec!(1), dec!(2), dec!(1), dec!(1))]);
        let second = adj.add_line(line(dec!(3), dec!(1), dec!(1), dec!(2))).unwrap();
        let third = adj.add_line(line(dec!(0), dec!(1), dec!(1), dec!(2))).unwrap();
        assert_eq!((second, third), (2, 3));

        adj.remove_line(2).unwrap();
        let numbers: Vec<u32> = adj.lines().iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(adj.remove_line(9), Err(InventoryError::LineNotFound(9)));

        let existing = adj.lines()[0].clone();
        let mut dup = line(dec!(1), dec!(1), dec!(1), dec!(1));
        dup.product_id = existing.product_id;
        assert!(matches!(adj.add_line(dup), Err(InventoryError::DuplicateProduct(_))));
    }

    #[test]
    fn test_update_replaces_lines_only_in_draft() {
        let mut adj = create(vec![line(dec!(1), dec!(2), dec!(1), dec!(1))]);
        adj.update(input(vec![
            line(dec!(1), dec!(0), dec!(1), dec!(1)),
            line(dec!(2), dec!(0), dec!(1), dec!(1)),
        ]))
        .unwrap();
        assert_eq!(adj.lines().len(), 2);
        assert_eq!(adj.shortage_total().unwrap(), dec!(3));

        adj.header.mark_posted(None, Utc::now()).unwrap();
        assert!(matches!(
            adj.update(input(vec![])),
            Err(InventoryError::Document(_))
        ));
        assert!(matches!(
            adj.add_line(line(dec!(1), dec!(1), dec!(1), dec!(1))),
            Err(InventoryError::Document(_))
        ));
    }
}
