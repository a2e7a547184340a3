//! Property-based tests for balance validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{BALANCE_TOLERANCE, line_sum, validate_balance};
use super::error::BookingError;
use super::types::ProposedLine;

/// Strategy for signed amounts with four decimal places.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

/// Strategy for lines whose amounts are negated back to a zero total.
fn balanced_lines_strategy() -> impl Strategy<Value = Vec<ProposedLine>> {
    prop::collection::vec((1000i32..9999i32, amount_strategy()), 1..10).prop_map(|pairs| {
        let mut lines: Vec<ProposedLine> = pairs
            .iter()
            .map(|(account, amount)| ProposedLine::new(*account, "debit", *amount))
            .collect();
        let total: Decimal = pairs.iter().map(|(_, amount)| *amount).sum();
        lines.push(ProposedLine::new(2000, "offset", -total));
        lines
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Lines that net to exactly zero always validate.
    #[test]
    fn prop_balanced_lines_accepted(lines in balanced_lines_strategy()) {
        prop_assert_eq!(line_sum(&lines), Decimal::ZERO);
        prop_assert!(validate_balance(&lines).is_ok());
    }

    /// Line order never changes the outcome.
    #[test]
    fn prop_order_independent(lines in balanced_lines_strategy(), skew in amount_strategy()) {
        let mut lines = lines;
        lines.push(ProposedLine::new(3000, "skew", skew));
        let forward = validate_balance(&lines).is_ok();
        lines.reverse();
        prop_assert_eq!(forward, validate_balance(&lines).is_ok());
    }

    /// A skew beyond the tolerance is rejected and reported exactly.
    #[test]
    fn prop_skew_beyond_tolerance_rejected(
        lines in balanced_lines_strategy(),
        skew in amount_strategy(),
    ) {
        prop_assume!(skew.abs() > BALANCE_TOLERANCE);
        let mut lines = lines;
        lines.push(ProposedLine::new(3000, "skew", skew));

        match validate_balance(&lines) {
            Err(BookingError::Unbalanced { sum }) => prop_assert_eq!(sum, skew),
            other => prop_assert!(false, "expected Unbalanced, got {:?}", other),
        }
    }

    /// A skew within the tolerance is accepted.
    #[test]
    fn prop_skew_within_tolerance_accepted(
        lines in balanced_lines_strategy(),
        skew_units in -10i64..=10i64,
    ) {
        // Four decimal places: -0.0010 ..= 0.0010
        let mut lines = lines;
        lines.push(ProposedLine::new(3000, "rounding", Decimal::new(skew_units, 4)));
        prop_assert!(validate_balance(&lines).is_ok());
    }
}
