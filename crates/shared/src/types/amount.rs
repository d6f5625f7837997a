//! Decimal rounding rules for money and quantities.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Both helpers use banker's rounding (midpoint to even).

use rust_decimal::{Decimal, RoundingStrategy};

/// Scale of monetary amounts on documents.
pub const MONEY_SCALE: u32 = 2;

/// Scale of quantities and derived costs on inventory lines.
pub const QUANTITY_SCALE: u32 = 4;

/// Rounds a document amount to two decimal places.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a quantity or per-line cost to four decimal places.
#[must_use]
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_bankers() {
        assert_eq!(round_money(dec!(10.125)), dec!(10.12));
        assert_eq!(round_money(dec!(10.135)), dec!(10.14));
        assert_eq!(round_money(dec!(10.1)), dec!(10.1));
    }

    #[test]
    fn test_round_quantity() {
        assert_eq!(round_quantity(dec!(1.23456)), dec!(1.2346));
        assert_eq!(round_quantity(dec!(5) * dec!(4.00)), dec!(20.00));
    }
}
