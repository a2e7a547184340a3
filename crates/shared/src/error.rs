//! Application-wide error types.

use thiserror::Error;

/// Errors raised outside the booking flow, before a request reaches a handler.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller identity could not be resolved.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized() {
        let err = AppError::Unauthorized("msg".into());
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert_eq!(err.to_string(), "Authentication failed: msg");
    }
}
