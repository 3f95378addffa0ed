//! Admin gate: extracts and validates the access token, binds the actor.
//!
//! Token lookup prefers the `X-Admin-Token` header over standard bearer
//! auth. The blacklist is consulted before signature validation so a
//! revoked-but-otherwise-valid token is reported as revoked, not invalid.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use std::sync::Arc;

use super::{blacklist::TokenBlacklist, error::AuthError, session::SessionAuthority};

/// Authenticated identity bound into request extensions for audit logging.
#[derive(Debug, Clone)]
pub struct Actor {
    pub username: String,
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get("x-admin-token")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        return Some(token.to_string());
    }

    bearer_token(headers)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Middleware guarding every admin route.
///
/// # Errors
/// `MissingToken` when no token is supplied, `Revoked` when the blacklist
/// knows the token, `InvalidToken` on any signature/expiry/algorithm
/// failure.
pub async fn authorize(
    Extension(authority): Extension<Arc<SessionAuthority>>,
    Extension(blacklist): Extension<TokenBlacklist>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token(request.headers()).ok_or(AuthError::MissingToken)?;

    if blacklist.is_revoked(&token).await {
        return Err(AuthError::Revoked);
    }

    let claims = authority.verify(&token)?;

    request.extensions_mut().insert(Actor {
        username: claims.sub,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn admin_header_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-admin-token", HeaderValue::from_static("header-token"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer bearer-token"),
        );
        assert_eq!(extract_token(&headers), Some("header-token".to_string()));
    }

    #[test]
    fn bearer_token_is_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token(&headers), Some("abc.def".to_string()));
    }

    #[test]
    fn lowercase_bearer_prefix_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def"));
        assert_eq!(extract_token(&headers), Some("abc.def".to_string()));
    }

    #[test]
    fn missing_or_empty_tokens_yield_none() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_token(&headers), None);
    }
}
