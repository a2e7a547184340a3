//! Mapping of application errors to HTTP responses.

use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use tally_shared::AppError;

/// Builds the `{ error, message }` response for an application error.
pub fn app_error_response(e: &AppError) -> (StatusCode, Json<Value>) {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string(),
        })),
    )
}
