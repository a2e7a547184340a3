//! Broadcast delivery of booking events.

use tokio::sync::broadcast;
use tracing::debug;

use tally_core::booking::{BookingEventSink, VoucherBookedEvent};

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Publishes booked vouchers on a tokio broadcast channel.
///
/// Webhook dispatch and other listeners call [`BroadcastEventSink::subscribe`].
/// With no subscriber the event is dropped; a lagging subscriber loses the
/// oldest events.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<VoucherBookedEvent>,
}

impl BroadcastEventSink {
    /// Creates a sink buffering `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<VoucherBookedEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl BookingEventSink for BroadcastEventSink {
    fn voucher_booked(&self, event: &VoucherBookedEvent) {
        if self.sender.send(event.clone()).is_err() {
            debug!(voucher_id = %event.voucher_id, "No subscribers for voucher booked event");
        }
    }
}
