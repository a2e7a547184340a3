//! Accounting period locks.
//!
//! An organization closes a date range for edits by locking the accounting
//! period that covers it. Bookings dated inside a locked range are refused.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The part of an accounting period that matters for posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// First day of the period (inclusive).
    pub from_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub to_date: NaiveDate,
    /// Whether the period is closed for posting.
    pub is_locked: bool,
}

impl AccountingPeriod {
    /// Returns true if `date` falls within the period, both ends inclusive.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from_date <= date && date <= self.to_date
    }

    /// Returns true if this period forbids posting on `date`.
    #[must_use]
    pub fn locks(&self, date: NaiveDate) -> bool {
        self.is_locked && self.contains(date)
    }
}

/// Returns true if any of the periods locks `date`.
///
/// A voucher without a date is never locked.
#[must_use]
pub fn is_date_locked(periods: &[AccountingPeriod], date: Option<NaiveDate>) -> bool {
    date.is_some_and(|date| periods.iter().any(|period| period.locks(date)))
}
