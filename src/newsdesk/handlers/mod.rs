pub mod health;
pub use self::health::health;

pub mod audit;
pub mod auth;

pub mod ads;
pub mod archive_books;
pub mod articles;
pub mod contact_messages;
pub mod global_anchors;
pub mod global_events;
pub mod headlines;
pub mod impacts;
pub mod perspectives;
pub mod photos;
pub mod search;
pub mod site_config;
pub mod timeline;

// common functions for the handlers
use axum::http::{HeaderMap, StatusCode};
use regex::Regex;
use tracing::error;
use ulid::Ulid;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Client identity used for rate limiting and audit records. The service
/// runs behind a reverse proxy, so forwarded headers win over the socket.
pub fn client_addr(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
        })
        .unwrap_or("unknown")
        .to_string()
}

/// Derive an entity id from a human-readable seed, like the editor UI
/// expects ("auto-my-article-title"), or mint a ULID when there is nothing
/// to slug.
pub fn fallback_id(prefix: &str, seed: &str) -> String {
    let slug: String = seed
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();

    if slug.is_empty() {
        format!("{prefix}-{}", Ulid::new().to_string().to_lowercase())
    } else {
        format!("{prefix}-{slug}")
    }
}

pub(crate) fn db_error(err: &sqlx::Error) -> (StatusCode, String) {
    error!("Database error: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database error".to_string(),
    )
}
