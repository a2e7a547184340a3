//! Balance validation for proposed ledger lines.

use rust_decimal::Decimal;

use super::error::BookingError;
use super::types::ProposedLine;

/// Largest absolute line sum still accepted as balanced (0.001).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Sums the posted amount of every line. Missing amounts count as zero.
#[must_use]
pub fn line_sum(lines: &[ProposedLine]) -> Decimal {
    lines.iter().map(ProposedLine::posted_amount).sum()
}

/// Validates that the lines sum to zero within [`BALANCE_TOLERANCE`].
///
/// An empty set of lines is balanced; the booking then only changes the
/// voucher status.
///
/// # Errors
///
/// Returns `BookingError::Unbalanced` carrying the computed sum.
pub fn validate_balance(lines: &[ProposedLine]) -> Result<(), BookingError> {
    let sum = line_sum(lines);
    if sum.abs() > BALANCE_TOLERANCE {
        return Err(BookingError::Unbalanced { sum });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(amount: Decimal) -> ProposedLine {
        ProposedLine::new(4000, "line", amount)
    }

    #[test]
    fn test_tolerance_value() {
        assert_eq!(BALANCE_TOLERANCE, dec!(0.001));
    }

    #[test]
    fn test_balanced_lines() {
        let lines = vec![line(dec!(100)), line(dec!(-100))];
        assert!(validate_balance(&lines).is_ok());
    }

    #[test]
    fn test_within_tolerance() {
        let lines = vec![line(dec!(100.0005)), line(dec!(-100))];
        assert!(validate_balance(&lines).is_ok());
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let lines = vec![line(dec!(50.001)), line(dec!(-50))];
        assert!(validate_balance(&lines).is_ok());

        let lines = vec![line(dec!(50)), line(dec!(-50.001))];
        assert!(validate_balance(&lines).is_ok());
    }

    #[test]
    fn test_outside_tolerance() {
        let lines = vec![line(dec!(100.002)), line(dec!(-100))];
        match validate_balance(&lines) {
            Err(BookingError::Unbalanced { sum }) => assert_eq!(sum, dec!(0.002)),
            other => panic!("expected Unbalanced, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_lines_are_balanced() {
        assert!(validate_balance(&[]).is_ok());
        assert_eq!(line_sum(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_missing_amount_counts_as_zero() {
        let lines = vec![
            line(dec!(25)),
            ProposedLine {
                account_number: 2000,
                description: "no amount".into(),
                amount: None,
            },
            line(dec!(-25)),
        ];
        assert!(validate_balance(&lines).is_ok());

        let lines = vec![ProposedLine {
            account_number: 2000,
            description: String::new(),
            amount: None,
        }];
        assert!(validate_balance(&lines).is_ok());
    }

    #[test]
    fn test_single_sided_is_unbalanced() {
        let lines = vec![line(dec!(10)), line(dec!(5))];
        assert!(matches!(
            validate_balance(&lines),
            Err(BookingError::Unbalanced { sum }) if sum == dec!(15)
        ));
    }
}
