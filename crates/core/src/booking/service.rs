//! Booking state machine.
//!
//! Stateless checks the booking orchestrator runs, in order, before it opens
//! the booking transaction. None of them have side effects.

use chrono::{DateTime, NaiveDate, Utc};
use tally_shared::types::UserId;
use uuid::Uuid;

use crate::auth::Actor;
use crate::booking::balance::validate_balance;
use crate::booking::error::BookingError;
use crate::booking::types::{ProposedLine, VoucherStatus};

/// A validated `Draft -> Booked` transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingTransition {
    /// Status after the transition (always `Booked`).
    pub new_status: VoucherStatus,
    /// Who books the voucher.
    pub booked_by: UserId,
    /// Booking timestamp, also used to derive the entry date.
    pub booked_at: DateTime<Utc>,
}

impl BookingTransition {
    /// The date written on every posted entry: the booking day, not the voucher date.
    #[must_use]
    pub fn entry_date(&self) -> NaiveDate {
        self.booked_at.date_naive()
    }
}

/// Stateless service for voucher booking rules.
pub struct BookingService;

impl BookingService {
    /// Step 1: only admins may book.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Forbidden` if the actor lacks the admin role.
    pub fn authorize(actor: &Actor) -> Result<(), BookingError> {
        if actor.can_book() {
            Ok(())
        } else {
            Err(BookingError::Forbidden)
        }
    }

    /// Step 4: validate the status transition.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::AlreadyBooked` if the voucher is not a draft.
    pub fn book(
        current_status: VoucherStatus,
        voucher_id: Uuid,
        booked_by: UserId,
    ) -> Result<BookingTransition, BookingError> {
        match current_status {
            VoucherStatus::Draft => Ok(BookingTransition {
                new_status: VoucherStatus::Booked,
                booked_by,
                booked_at: Utc::now(),
            }),
            VoucherStatus::Booked => Err(BookingError::AlreadyBooked(voucher_id)),
        }
    }

    /// Step 5: refuse vouchers dated inside a locked period.
    ///
    /// `date_locked` is the answer of the period lock lookup for
    /// `voucher_date`. A voucher without a date is never refused.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::PeriodLocked` with the offending date.
    pub fn check_period(voucher_date: Option<NaiveDate>, date_locked: bool) -> Result<(), BookingError> {
        match voucher_date {
            Some(date) if date_locked => Err(BookingError::PeriodLocked { date }),
            _ => Ok(()),
        }
    }

    /// Step 6: the proposed lines must balance.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::Unbalanced` with the computed sum.
    pub fn check_lines(lines: &[ProposedLine]) -> Result<(), BookingError> {
        validate_balance(lines)
    }
}
