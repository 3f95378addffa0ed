//! Admin session endpoints: login, refresh, verify, logout.

pub mod blacklist;
pub mod error;
pub mod middleware;
pub mod rate_limit;
pub mod session;

use axum::{
    extract::Extension,
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap,
    },
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, instrument};

use self::{
    blacklist::TokenBlacklist,
    error::AuthError,
    middleware::extract_token,
    rate_limit::{RateLimiter, LOGIN_RATE},
    session::{SessionAuthority, REFRESH_COOKIE},
};
use crate::newsdesk::handlers::{audit, client_addr};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenBody {
    token: String,
}

/// `POST /admin/login`
///
/// Every attempt counts against the login rate limit, successful or not.
/// Unknown users and wrong passwords fail identically.
///
/// # Errors
/// `RateLimited`, `AuthenticationFailed`, or `StoreUnavailable` when the
/// credential store cannot be reached.
#[instrument(skip(pool, authority, limiter, headers, body))]
pub async fn login(
    Extension(pool): Extension<PgPool>,
    Extension(authority): Extension<Arc<SessionAuthority>>,
    Extension(limiter): Extension<RateLimiter>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let client = client_addr(&headers);
    limiter.check(&LOGIN_RATE, &client).await?;

    let hash: Option<String> =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE username = $1")
            .bind(&body.username)
            .fetch_optional(&pool)
            .await
            .map_err(|err| {
                error!("Credential lookup failed: {err}");
                AuthError::StoreUnavailable
            })?;

    let Some(hash) = hash else {
        return Err(AuthError::AuthenticationFailed);
    };

    if !bcrypt::verify(&body.password, &hash).unwrap_or(false) {
        return Err(AuthError::AuthenticationFailed);
    }

    let pair = authority.issue_pair(&body.username)?;

    audit::record(
        &pool,
        Some(&body.username),
        audit::ACTION_LOGIN,
        "User",
        &body.username,
        &client,
        "Successful login attempt",
    )
    .await;

    let mut response_headers = HeaderMap::new();
    match authority.refresh_cookie(&pair.refresh) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to set refresh cookie: {err}"),
    }

    Ok((response_headers, Json(TokenBody { token: pair.access })))
}

/// `POST /admin/refresh`
///
/// Rotation: a valid refresh cookie yields a brand-new access/refresh pair.
/// The blacklist is not consulted for refresh tokens.
///
/// # Errors
/// `MissingToken` without a cookie, `InvalidToken` on any validation
/// failure.
#[instrument(skip(authority, headers))]
pub async fn refresh(
    Extension(authority): Extension<Arc<SessionAuthority>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let token = refresh_cookie_token(&headers).ok_or(AuthError::MissingToken)?;

    let claims = authority.verify(&token)?;

    let pair = authority.issue_pair(&claims.sub)?;

    let mut response_headers = HeaderMap::new();
    match authority.refresh_cookie(&pair.refresh) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to rotate refresh cookie: {err}"),
    }

    Ok((response_headers, Json(TokenBody { token: pair.access })))
}

/// `GET /admin/verify`
///
/// The authorize middleware has already done every check; this is just the
/// liveness probe behind it.
pub async fn verify() -> impl IntoResponse {
    Json(json!({ "authenticated": true }))
}

/// `POST /admin/logout`
///
/// Blacklists the supplied access token for 15 minutes and clears the
/// refresh cookie. Always succeeds from the caller's point of view, even
/// when the blacklist store is down.
#[instrument(skip(pool, blacklist, authority, headers))]
pub async fn logout(
    Extension(pool): Extension<PgPool>,
    Extension(blacklist): Extension<TokenBlacklist>,
    Extension(authority): Extension<Arc<SessionAuthority>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let client = client_addr(&headers);

    if let Some(token) = extract_token(&headers) {
        blacklist.revoke(&token).await;
    }

    audit::record(
        &pool,
        None,
        audit::ACTION_LOGOUT,
        "User",
        "",
        &client,
        "User logged out",
    )
    .await;

    let mut response_headers = HeaderMap::new();
    match authority.clear_refresh_cookie() {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to clear refresh cookie: {err}"),
    }

    (response_headers, Json(json!({ "message": "Logged out" })))
}

fn refresh_cookie_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == REFRESH_COOKIE && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}
