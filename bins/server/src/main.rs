//! Tally API Server
//!
//! Main entry point for the voucher booking service.

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tally_api::{AppState, BroadcastEventSink, create_router};
use tally_db::{BookingRepository, connect_with};
use tally_shared::{AppConfig, LogFormat, LoggingConfig};

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tally=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let booking = BookingRepository::new(db).with_transaction_timeout(
        Duration::from_secs(config.booking.transaction_timeout_secs),
    );

    if config.booking.ensure_schema_on_startup {
        booking
            .ensure_schema()
            .await
            .context("Schema guard failed")?;
        info!("Booking schema verified");
    }

    // Create application state
    let state = AppState::new(booking, BroadcastEventSink::default());

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
