//! "Voucher booked" domain event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tally_shared::types::{OrganizationId, UserId, VoucherId};

/// Emitted after a booking commits. Webhook dispatch subscribes to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoucherBookedEvent {
    /// Organization that owns the voucher.
    pub organization_id: OrganizationId,
    /// The booked voucher.
    pub voucher_id: VoucherId,
    /// Number assigned by the booking.
    pub voucher_number: i64,
    /// Who booked it.
    pub booked_by: UserId,
    /// When it was booked.
    pub booked_at: DateTime<Utc>,
}

/// Receiver of booking events. Emission is fire-and-forget.
pub trait BookingEventSink: Send + Sync {
    /// Called once per committed booking.
    fn voucher_booked(&self, event: &VoucherBookedEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl BookingEventSink for NoopEventSink {
    fn voucher_booked(&self, _event: &VoucherBookedEvent) {}
}
