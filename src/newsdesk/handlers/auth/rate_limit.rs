//! Fixed-window rate limiting backed by shared Redis counters.
//!
//! Windows are anchored to wall-clock time, so every server instance
//! increments the same counter for the same client in the same minute. A
//! process-local counter map is available for running without Redis.

use axum::{extract::Request, middleware::Next, response::Response, Extension};
use chrono::Utc;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tracing::{debug, warn};

use super::error::AuthError;
use crate::newsdesk::handlers::client_addr;

#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub scope: &'static str,
    pub limit: i64,
    pub window_secs: i64,
}

/// Login attempts, successful or not: 5 per minute per client.
pub const LOGIN_RATE: RateLimit = RateLimit {
    scope: "login",
    limit: 5,
    window_secs: 60,
};

/// Admin mutations: 30 per minute per client.
pub const MUTATION_RATE: RateLimit = RateLimit {
    scope: "mutation",
    limit: 30,
    window_secs: 60,
};

#[derive(Clone)]
enum Store {
    Redis(ConnectionManager),
    Memory(Arc<Mutex<HashMap<String, i64>>>),
    Disabled,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Store,
}

impl RateLimiter {
    #[must_use]
    pub fn new(conn: Option<ConnectionManager>) -> Self {
        let store = match conn {
            Some(conn) => Store::Redis(conn),
            None => Store::Disabled,
        };

        Self { store }
    }

    /// Process-local counters, shared between clones of this instance only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Store::Memory(Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    fn window_key(rate: &RateLimit, client: &str, now_secs: i64) -> String {
        let window = now_secs / rate.window_secs;
        format!("ratelimit:{}:{client}:{window}", rate.scope)
    }

    /// Count one attempt and decide whether it is allowed.
    ///
    /// The counter is bumped before the decision, so refused attempts still
    /// weigh against the client. When the counter store is down, requests
    /// are allowed through; losing throttling beats losing logins.
    ///
    /// # Errors
    /// Fails with `RateLimited` when the window limit is exceeded.
    pub async fn check(&self, rate: &RateLimit, client: &str) -> Result<(), AuthError> {
        self.check_at(rate, client, Utc::now().timestamp()).await
    }

    async fn check_at(
        &self,
        rate: &RateLimit,
        client: &str,
        now_secs: i64,
    ) -> Result<(), AuthError> {
        let key = Self::window_key(rate, client, now_secs);

        let count: i64 = match &self.store {
            Store::Redis(conn) => {
                let mut conn = conn.clone();
                match conn.incr(&key, 1).await {
                    Ok(count) => {
                        // First hit in the window sets the expiry; double the
                        // window keeps the key alive through clock skew
                        // between instances.
                        if count == 1 {
                            if let Err(err) = conn.expire::<_, ()>(&key, rate.window_secs * 2).await
                            {
                                debug!("Failed to set rate limit expiry: {err}");
                            }
                        }
                        count
                    }
                    Err(err) => {
                        warn!("Rate limit counter unavailable, allowing request: {err}");
                        return Ok(());
                    }
                }
            }
            Store::Memory(counters) => match counters.lock() {
                Ok(mut counters) => {
                    let count = counters.entry(key).or_insert(0);
                    *count += 1;
                    *count
                }
                Err(_) => return Ok(()),
            },
            Store::Disabled => return Ok(()),
        };

        if count > rate.limit {
            return Err(AuthError::RateLimited);
        }

        Ok(())
    }
}

/// Middleware applying the mutation limit to admin write routes.
///
/// # Errors
/// Fails with `RateLimited` when the client exceeds 30 mutations a minute.
pub async fn limit_mutations(
    Extension(limiter): Extension<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let client = client_addr(request.headers());
    limiter.check(&MUTATION_RATE, &client).await?;

    Ok(next.run(request).await)
}
