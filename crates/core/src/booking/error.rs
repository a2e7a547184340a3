//! Booking error types.
//!
//! Every failure a booking attempt can surface to its caller. Precondition
//! failures never leave partial state; `Infrastructure` failures roll back
//! the booking transaction and may be retried from the start.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while booking a voucher.
#[derive(Debug, Error)]
pub enum BookingError {
    // ========== Authorization ==========
    /// The actor is not allowed to book vouchers.
    #[error("Booking vouchers requires the admin role")]
    Forbidden,

    // ========== State Errors ==========
    /// No voucher with this ID exists in the organization.
    #[error("Voucher not found: {0}")]
    NotFound(Uuid),

    /// The voucher has already been booked.
    #[error("Voucher {0} is already booked")]
    AlreadyBooked(Uuid),

    // ========== Validation Errors ==========
    /// The voucher date falls inside a locked accounting period.
    #[error("Accounting period containing {date} is locked")]
    PeriodLocked {
        /// The offending voucher date.
        date: NaiveDate,
    },

    /// The proposed lines do not sum to zero.
    #[error("Voucher lines are not balanced, sum is {sum}")]
    Unbalanced {
        /// The computed sum of all line amounts.
        sum: Decimal,
    },

    // ========== Infrastructure ==========
    /// Store unreachable, transaction conflict, or timeout.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl BookingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) => "VOUCHER_NOT_FOUND",
            Self::AlreadyBooked(_) => "VOUCHER_ALREADY_BOOKED",
            Self::PeriodLocked { .. } => "PERIOD_LOCKED",
            Self::Unbalanced { .. } => "UNBALANCED_VOUCHER",
            Self::Infrastructure(_) => "INFRASTRUCTURE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 403 Forbidden - permission errors
            Self::Forbidden => 403,

            // 404 Not Found
            Self::NotFound(_) => 404,

            // 409 Conflict - state errors
            Self::AlreadyBooked(_) => 409,

            // 422 Unprocessable - business rule violations
            Self::PeriodLocked { .. } | Self::Unbalanced { .. } => 422,

            // 500 Internal Server Error
            Self::Infrastructure(_) => 500,
        }
    }

    /// Returns true if the whole booking may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Infrastructure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(BookingError::Forbidden, "FORBIDDEN", 403)]
    #[case(BookingError::NotFound(Uuid::nil()), "VOUCHER_NOT_FOUND", 404)]
    #[case(BookingError::AlreadyBooked(Uuid::nil()), "VOUCHER_ALREADY_BOOKED", 409)]
    #[case(
        BookingError::PeriodLocked { date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap() },
        "PERIOD_LOCKED",
        422
    )]
    #[case(BookingError::Unbalanced { sum: dec!(0.002) }, "UNBALANCED_VOUCHER", 422)]
    #[case(BookingError::Infrastructure("down".into()), "INFRASTRUCTURE_ERROR", 500)]
    fn test_codes_and_status(#[case] err: BookingError, #[case] code: &str, #[case] status: u16) {
        assert_eq!(err.error_code(), code);
        assert_eq!(err.http_status_code(), status);
    }

    #[test]
    fn test_only_infrastructure_is_retryable() {
        assert!(BookingError::Infrastructure("conflict".into()).is_retryable());
        assert!(!BookingError::Forbidden.is_retryable());
        assert!(!BookingError::AlreadyBooked(Uuid::nil()).is_retryable());
        assert!(!BookingError::Unbalanced { sum: dec!(1) }.is_retryable());
    }

    #[test]
    fn test_error_display_carries_details() {
        let err = BookingError::PeriodLocked {
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        };
        assert_eq!(err.to_string(), "Accounting period containing 2026-01-15 is locked");

        let err = BookingError::Unbalanced { sum: dec!(0.002) };
        assert_eq!(err.to_string(), "Voucher lines are not balanced, sum is 0.002");
    }
}
