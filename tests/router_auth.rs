//! End-to-end session flow through the real router.
//!
//! Postgres is a lazy pool pointing at an unreachable address and the
//! denylist and rate limiter run on their process-local backends, so the
//! tests cover both the degraded login path (fails closed) and the full
//! token lifecycle: verification, refresh rotation, logout and revocation.

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
        Request, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

use newsdesk::newsdesk::{
    cache::SearchCache,
    handlers::auth::{
        blacklist::TokenBlacklist, rate_limit::RateLimiter, session::SessionAuthority,
    },
    router, AppServices,
};

const SECRET: &str = "integration-secret";

fn authority() -> Arc<SessionAuthority> {
    Arc::new(SessionAuthority::new(
        &SecretString::from(SECRET.to_string()),
        false,
    ))
}

fn app() -> (Router, Arc<SessionAuthority>) {
    let options = PgConnectOptions::new()
        .host("127.0.0.1")
        .port(1)
        .username("invalid")
        .database("invalid")
        .ssl_mode(PgSslMode::Disable);
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy_with(options);

    let authority = authority();
    let services = AppServices {
        pool,
        authority: authority.clone(),
        blacklist: TokenBlacklist::in_memory(),
        limiter: RateLimiter::in_memory(),
        cache: SearchCache::new(None),
    };

    let app = router(services, &[]).expect("router");
    (app, authority)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_answers_without_any_store() {
    let (app, _) = app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_fails_closed_when_credential_store_is_down() {
    let (app, _) = app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"admin","password":"hunter2"}"#,
                ))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn verify_accepts_a_freshly_issued_token() {
    let (app, authority) = app();
    let pair = authority.issue_pair("admin").expect("token pair");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/verify")
                .header(AUTHORIZATION, format!("Bearer {}", pair.access))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let value = body_json(response).await;
    assert_eq!(value["authenticated"], true);
}

#[tokio::test]
async fn verify_accepts_the_admin_token_header() {
    let (app, authority) = app();
    let pair = authority.issue_pair("admin").expect("token pair");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/verify")
                .header("x-admin-token", pair.access)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn verify_rejects_missing_and_garbage_tokens() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/verify")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/verify")
                .header(AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn verify_rejects_a_token_signed_with_another_secret() {
    let (app, _) = app();
    let foreign = SessionAuthority::new(&SecretString::from("other".to_string()), false);
    let pair = foreign.issue_pair("admin").expect("token pair");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/verify")
                .header(AUTHORIZATION, format!("Bearer {}", pair.access))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_the_cookie() {
    let (app, authority) = app();
    let pair = authority.issue_pair("admin").expect("token pair");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/refresh")
                .header(COOKIE, format!("refresh_token={}", pair.refresh))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("rotated refresh cookie");
    assert!(cookie.starts_with("refresh_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=604800"));

    let value = body_json(response).await;
    let access = value["token"].as_str().expect("access token");
    let claims = authority.verify(access).expect("verifiable access token");
    assert_eq!(claims.sub, "admin");
}

#[tokio::test]
async fn concurrent_refreshes_with_the_same_token_both_succeed() {
    // Refresh tokens are not single-use; two racing refreshes both get a
    // fresh pair.
    let (app, authority) = app();
    let pair = authority.issue_pair("admin").expect("token pair");

    let request = |cookie: String| {
        Request::builder()
            .method("POST")
            .uri("/admin/refresh")
            .header(COOKIE, cookie)
            .body(Body::empty())
            .expect("request")
    };

    let cookie = format!("refresh_token={}", pair.refresh);
    let (first, second) = tokio::join!(
        app.clone().oneshot(request(cookie.clone())),
        app.oneshot(request(cookie)),
    );

    assert_eq!(first.expect("response").status(), StatusCode::OK);
    assert_eq!(second.expect("response").status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_without_a_cookie_is_unauthorized() {
    let (app, _) = app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/refresh")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_with_a_tampered_cookie_is_unauthorized() {
    let (app, _) = app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/refresh")
                .header(COOKIE, "refresh_token=aaaa.bbbb.cccc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_always_clears_the_cookie() {
    let (app, _) = app();

    // No token, no working audit store: the response still succeeds and
    // clears the refresh cookie.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/logout")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("clearing cookie");
    assert!(cookie.starts_with("refresh_token=;"));
    assert!(cookie.contains("Max-Age=0"));

    let value = body_json(response).await;
    assert_eq!(value["message"], "Logged out");
}

#[tokio::test]
async fn logout_revokes_the_access_token() {
    // Full lifecycle: the token works, logout blacklists it, and the same
    // token is then refused as revoked rather than invalid.
    let (app, authority) = app();
    let pair = authority.issue_pair("admin").expect("token pair");
    let bearer = format!("Bearer {}", pair.access);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/verify")
                .header(AUTHORIZATION, &bearer)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/logout")
                .header(AUTHORIZATION, &bearer)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/verify")
                .header(AUTHORIZATION, &bearer)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let value = body_json(response).await;
    assert_eq!(value["error"], "Token has been revoked");
}

#[tokio::test]
async fn logout_revokes_the_admin_header_token_too() {
    // The admin UI authenticates with X-Admin-Token, so logout honors the
    // same header preference as the gate.
    let (app, authority) = app();
    let pair = authority.issue_pair("admin").expect("token pair");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/logout")
                .header("x-admin-token", pair.access.clone())
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/verify")
                .header("x-admin-token", pair.access)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mutations_require_a_token() {
    let (app, _) = app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/articles")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"title":"No token"}"#))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authorized_mutation_reaches_the_validation_layer() {
    let (app, authority) = app();
    let pair = authority.issue_pair("admin").expect("token pair");

    // Missing title: the request passes the gate and fails on validation,
    // not on auth.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/articles")
                .header(AUTHORIZATION, format!("Bearer {}", pair.access))
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_search_misses_without_stores() {
    let (app, _) = app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/search?q=")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-cache").and_then(|v| v.to_str().ok()),
        Some("MISS")
    );

    let value = body_json(response).await;
    assert_eq!(value["articles"], serde_json::json!([]));
    assert_eq!(value["books"], serde_json::json!([]));
}
