//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::actor_middleware};

pub mod health;
pub mod vouchers;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    // Protected routes that require a resolved actor
    let protected_routes = Router::new()
        .merge(vouchers::routes())
        .layer(middleware::from_fn(actor_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
