//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Actor resolution from gateway headers
//! - Booking error to HTTP response mapping
//! - The broadcast sink for "voucher booked" events

pub mod error;
pub mod events;
pub mod middleware;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tally_db::BookingRepository;

pub use events::BroadcastEventSink;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Voucher booking orchestrator.
    pub booking: Arc<BookingRepository>,
}

impl AppState {
    /// Wires the booking repository to publish into `events`.
    #[must_use]
    pub fn new(booking: BookingRepository, events: BroadcastEventSink) -> Self {
        Self {
            booking: Arc::new(booking.with_event_sink(Arc::new(events))),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
