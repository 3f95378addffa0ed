//! Error taxonomy for the session authority.
//!
//! Credential failures are deliberately uniform: the caller can never tell
//! an unknown user from a wrong password. `Revoked` maps to the same status
//! as `InvalidToken` and exists only so operators can tell them apart in
//! traces.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    AuthenticationFailed,
    MissingToken,
    InvalidToken,
    Revoked,
    RateLimited,
    StoreUnavailable,
}

impl AuthError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::AuthenticationFailed
            | Self::MissingToken
            | Self::InvalidToken
            | Self::Revoked => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn message(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "Authentication failed",
            Self::MissingToken => "No token provided",
            Self::InvalidToken => "Invalid or expired token",
            Self::Revoked => "Token has been revoked",
            Self::RateLimited => "Too many requests, retry in a minute",
            Self::StoreUnavailable => "Service temporarily unavailable",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            AuthError::AuthenticationFailed.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Revoked.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::RateLimited.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AuthError::StoreUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn credential_failure_message_is_generic() {
        let response = AuthError::AuthenticationFailed.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        // The body must not leak whether the user exists.
        assert_eq!(
            AuthError::AuthenticationFailed.message(),
            "Authentication failed"
        );
    }
}
