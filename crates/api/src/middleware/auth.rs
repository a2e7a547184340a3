//! Actor resolution for protected routes.
//!
//! Tokens are validated by the gateway in front of this service. It forwards
//! the caller as `X-User-Id` (UUID) and `X-User-Roles` (comma-separated role
//! names); this module turns those headers into an [`Actor`].

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use tally_core::auth::Actor;
use tally_shared::{AppError, types::UserId};

use crate::error::app_error_response;

/// Header carrying the authenticated user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the user's roles.
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Why the headers did not yield an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRejection {
    /// No user ID header.
    MissingUserId,
    /// User ID header present but not a UUID.
    InvalidUserId,
}

impl ActorRejection {
    fn into_app_error(self) -> AppError {
        match self {
            Self::MissingUserId => AppError::Unauthorized("X-User-Id header is required".into()),
            Self::InvalidUserId => AppError::Unauthorized("X-User-Id must be a UUID".into()),
        }
    }

    fn into_response_parts(self) -> (StatusCode, Json<serde_json::Value>) {
        app_error_response(&self.into_app_error())
    }
}

/// Splits a comma-separated roles header, dropping blanks.
fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds the actor from gateway headers.
///
/// A missing roles header means no roles.
///
/// # Errors
///
/// Returns a rejection if the user ID header is missing or not a UUID.
pub fn resolve_actor(headers: &HeaderMap) -> Result<Actor, ActorRejection> {
    let raw_id = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ActorRejection::MissingUserId)?;

    let user_id = Uuid::parse_str(raw_id).map_err(|_| ActorRejection::InvalidUserId)?;

    let roles = headers
        .get(USER_ROLES_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(parse_roles)
        .unwrap_or_default();

    Ok(Actor::new(UserId::from_uuid(user_id), roles))
}

/// Middleware that resolves the actor and stores it in request extensions.
pub async fn actor_middleware(mut request: Request, next: Next) -> Response {
    match resolve_actor(request.headers()) {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response_parts().into_response(),
    }
}

/// Extractor for the resolved actor.
///
/// ```ignore
/// async fn handler(actor: AuthActor) -> impl IntoResponse {
///     let user_id = actor.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthActor(pub Actor);

impl AuthActor {
    /// Returns the acting user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.0.user_id
    }

    /// Consumes the extractor, returning the actor.
    #[must_use]
    pub fn into_inner(self) -> Actor {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(Self(actor.clone()));
        }
        resolve_actor(&parts.headers)
            .map(Self)
            .map_err(ActorRejection::into_response_parts)
    }
}
