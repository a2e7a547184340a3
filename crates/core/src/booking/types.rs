//! Booking domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{OrganizationId, VoucherId};

use crate::auth::Actor;

/// `voucher_type` written on every entry posted by a purchase voucher booking.
pub const VOUCHER_TYPE_PURCHASE: &str = "PurchaseVoucher";

/// `entry_type` written on every entry posted by a booking.
pub const ENTRY_TYPE_NORMAL: &str = "Normal";

/// Voucher status.
///
/// `Draft -> Booked` is the only transition; `Booked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Editable, not yet numbered.
    Draft,
    /// Numbered and posted to the ledger (immutable).
    Booked,
}

/// A ledger line proposed for posting when a voucher is booked.
///
/// `amount` is signed: positive debits, negative credits. A missing amount
/// counts as zero for balancing and is posted as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedLine {
    /// Chart-of-accounts number to post to.
    pub account_number: i32,
    /// Free-text line description.
    #[serde(default)]
    pub description: String,
    /// Signed amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl ProposedLine {
    /// Creates a line with an amount.
    #[must_use]
    pub fn new(account_number: i32, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_number,
            description: description.into(),
            amount: Some(amount),
        }
    }

    /// The amount that is summed and posted for this line.
    #[must_use]
    pub fn posted_amount(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}

/// Input for booking a voucher.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    /// Organization that owns the voucher.
    pub organization_id: OrganizationId,
    /// Voucher to book.
    pub voucher_id: VoucherId,
    /// Caller, already authenticated.
    pub actor: Actor,
    /// Lines to post. May be empty.
    pub lines: Vec<ProposedLine>,
}

/// Successful booking result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookingOutcome {
    /// The number assigned to the voucher.
    pub voucher_number: i64,
}
