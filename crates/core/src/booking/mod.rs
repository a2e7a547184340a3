//! Voucher booking.
//!
//! This module implements the pure side of booking a purchase voucher:
//! - Voucher status state machine (`Draft -> Booked`)
//! - Balance validation of proposed ledger lines
//! - Accounting period lock predicate
//! - Voucher number arithmetic
//! - Audit record and "voucher booked" event ports
//! - Error types for booking operations
//!
//! The transactional orchestration lives in the db crate and calls into
//! these functions.

pub mod audit;
pub mod balance;
pub mod error;
pub mod events;
pub mod period;
pub mod sequence;
pub mod service;
pub mod types;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod period_props;

pub use audit::{AuditError, AuditOperation, AuditRecord, AuditSink};
pub use balance::{BALANCE_TOLERANCE, line_sum, validate_balance};
pub use error::BookingError;
pub use events::{BookingEventSink, NoopEventSink, VoucherBookedEvent};
pub use period::{AccountingPeriod, is_date_locked};
pub use sequence::next_voucher_number;
pub use service::{BookingService, BookingTransition};
pub use types::{
    BookingOutcome, BookingRequest, ENTRY_TYPE_NORMAL, ProposedLine, VOUCHER_TYPE_PURCHASE,
    VoucherStatus,
};
