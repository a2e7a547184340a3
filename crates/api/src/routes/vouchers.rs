//! Purchase voucher booking routes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

use tally_core::booking::{BookingError, BookingRequest, ProposedLine};
use tally_shared::types::{OrganizationId, VoucherId};

use crate::AppState;
use crate::middleware::AuthActor;

/// Creates voucher routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/organizations/{org_id}/purchase-vouchers/{voucher_id}/book",
        post(book_voucher),
    )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for booking a voucher.
#[derive(Debug, Deserialize)]
pub struct BookVoucherRequest {
    /// Lines to post. An empty list books the voucher without entries.
    #[serde(default)]
    pub lines: Vec<BookLineRequest>,
}

/// One proposed ledger line.
#[derive(Debug, Deserialize)]
pub struct BookLineRequest {
    /// Account number.
    pub account_number: i32,
    /// Line description.
    #[serde(default)]
    pub description: Option<String>,
    /// Signed amount, as a JSON number or a decimal string.
    #[serde(default)]
    pub amount: Option<Value>,
}

/// Response for a booked voucher.
#[derive(Debug, Serialize)]
pub struct BookVoucherResponse {
    /// The assigned voucher number.
    pub voucher_number: i64,
}

/// Reads an amount the way clients send it.
///
/// Numbers and numeric strings are accepted. Anything else, including
/// `null` and non-numeric strings, is `None` and posts as zero.
fn parse_amount(value: &Value) -> Option<Decimal> {
    let parse = |raw: &str| {
        let raw = raw.trim();
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()
    };
    match value {
        Value::Number(n) => parse(&n.to_string()),
        Value::String(s) => parse(s),
        _ => None,
    }
}

impl From<BookLineRequest> for ProposedLine {
    fn from(line: BookLineRequest) -> Self {
        Self {
            account_number: line.account_number,
            description: line.description.unwrap_or_default(),
            amount: line.amount.as_ref().and_then(parse_amount),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/organizations/{org_id}/purchase-vouchers/{voucher_id}/book` - Book a draft voucher.
async fn book_voucher(
    State(state): State<AppState>,
    auth: AuthActor,
    Path((org_id, voucher_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<BookVoucherRequest>,
) -> impl IntoResponse {
    let request = BookingRequest {
        organization_id: OrganizationId::from_uuid(org_id),
        voucher_id: VoucherId::from_uuid(voucher_id),
        actor: auth.into_inner(),
        lines: payload.lines.into_iter().map(ProposedLine::from).collect(),
    };

    match state.booking.book(request).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(BookVoucherResponse {
                voucher_number: outcome.voucher_number,
            }),
        )
            .into_response(),
        Err(e) => map_booking_error(&e),
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps booking errors to HTTP responses.
fn map_booking_error(e: &BookingError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match e {
        BookingError::PeriodLocked { date } => json!({
            "error": e.error_code(),
            "message": e.to_string(),
            "date": date.to_string(),
        }),
        BookingError::Unbalanced { sum } => json!({
            "error": e.error_code(),
            "message": e.to_string(),
            "sum": sum.to_string(),
        }),
        BookingError::Infrastructure(detail) => {
            error!(error = %detail, "Booking failed on infrastructure");
            json!({
                "error": e.error_code(),
                "message": "The booking could not be completed, please retry",
                "retryable": true,
            })
        }
        _ => json!({
            "error": e.error_code(),
            "message": e.to_string(),
        }),
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use sea_orm::DatabaseConnection;
    use tally_db::BookingRepository;
    use tower::ServiceExt;

    use crate::{BroadcastEventSink, create_router};

    fn app() -> Router {
        let state = AppState::new(
            BookingRepository::new(DatabaseConnection::Disconnected),
            BroadcastEventSink::default(),
        );
        create_router(state)
    }

    fn book_uri() -> String {
        format!(
            "/api/v1/organizations/{}/purchase-vouchers/{}/book",
            Uuid::new_v4(),
            Uuid::new_v4()
        )
    }

    const BALANCED_BODY: &str = r#"{"lines":[
        {"account_number":4000,"description":"Goods","amount":100},
        {"account_number":2000,"description":"Supplier","amount":"-100"}
    ]}"#;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_book_without_actor_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::post(book_uri())
                    .header("content-type", "application/json")
                    .body(Body::from(BALANCED_BODY))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_book_with_invalid_user_id_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::post(book_uri())
                    .header("content-type", "application/json")
                    .header("x-user-id", "42")
                    .header("x-user-roles", "admin")
                    .body(Body::from(BALANCED_BODY))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_book_as_non_admin_is_forbidden() {
        let response = app()
            .oneshot(
                Request::post(book_uri())
                    .header("content-type", "application/json")
                    .header("x-user-id", Uuid::new_v4().to_string())
                    .header("x-user-roles", "accountant,viewer")
                    .body(Body::from(BALANCED_BODY))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["error"], "FORBIDDEN");
    }

    #[rstest]
    #[case(json!(100), Some(dec!(100)))]
    #[case(json!(12.5), Some(dec!(12.5)))]
    #[case(json!("0.0005"), Some(dec!(0.0005)))]
    #[case(json!(" -100.00 "), Some(dec!(-100)))]
    #[case(json!("abc"), None)]
    #[case(json!(null), None)]
    #[case(json!(true), None)]
    fn test_parse_amount(#[case] value: Value, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_amount(&value), expected);
    }

    #[test]
    fn test_line_conversion_defaults() {
        let line: BookLineRequest =
            serde_json::from_value(json!({ "account_number": 4000, "amount": "oops" })).unwrap();
        let proposed = ProposedLine::from(line);
        assert_eq!(proposed.account_number, 4000);
        assert_eq!(proposed.description, "");
        assert_eq!(proposed.posted_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_missing_lines_defaults_to_empty() {
        let request: BookVoucherRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.lines.is_empty());
    }

    #[rstest]
    #[case(BookingError::Forbidden, StatusCode::FORBIDDEN, "FORBIDDEN")]
    #[case(BookingError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND, "VOUCHER_NOT_FOUND")]
    #[case(BookingError::AlreadyBooked(Uuid::nil()), StatusCode::CONFLICT, "VOUCHER_ALREADY_BOOKED")]
    #[case(
        BookingError::Unbalanced { sum: dec!(0.002) },
        StatusCode::UNPROCESSABLE_ENTITY,
        "UNBALANCED_VOUCHER"
    )]
    #[case(
        BookingError::Infrastructure("timeout".to_string()),
        StatusCode::INTERNAL_SERVER_ERROR,
        "INFRASTRUCTURE_ERROR"
    )]
    #[tokio::test]
    async fn test_error_mapping(
        #[case] error: BookingError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = map_booking_error(&error);
        assert_eq!(response.status(), status);
        assert_eq!(body_json(response).await["error"], code);
    }

    #[tokio::test]
    async fn test_error_details() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let body = body_json(map_booking_error(&BookingError::PeriodLocked { date })).await;
        assert_eq!(body["date"], "2026-01-31");

        let body = body_json(map_booking_error(&BookingError::Unbalanced { sum: dec!(0.002) })).await;
        assert_eq!(body["sum"], "0.002");

        let body =
            body_json(map_booking_error(&BookingError::Infrastructure("db down".to_string()))).await;
        assert_eq!(body["retryable"], true);
        assert!(!body["message"].as_str().unwrap().contains("db down"));
    }
}
