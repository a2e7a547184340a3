//! Voucher number arithmetic.
//!
//! Voucher numbers are global: one sequence shared by every organization.
//! The database side serializes allocation; these helpers only define what
//! the next number is.

/// Returns the number that follows `current_max`.
///
/// `current_max` is the highest number handed out so far. `None`, zero and
/// negative values mean nothing has been numbered yet, so numbering starts
/// at 1.
#[must_use]
pub fn next_voucher_number(current_max: Option<i64>) -> i64 {
    match current_max {
        Some(max) if max > 0 => max.saturating_add(1),
        _ => 1,
    }
}
