//! Expiring denylist for access tokens revoked before their natural expiry.
//!
//! Backed by Redis so revocation is shared across instances; a process-local
//! map is available for single-instance deployments without Redis.

use redis::{aio::ConnectionManager, AsyncCommands};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing::{error, warn};

/// Entries live exactly as long as a freshly issued access token, measured
/// from the moment of logout rather than the token's original issuance.
pub const BLACKLIST_TTL_SECS: u64 = 15 * 60;

#[derive(Clone)]
enum Store {
    Redis(ConnectionManager),
    Memory(Arc<Mutex<HashMap<String, Instant>>>),
    Disabled,
}

#[derive(Clone)]
pub struct TokenBlacklist {
    store: Store,
}

impl TokenBlacklist {
    #[must_use]
    pub fn new(conn: Option<ConnectionManager>) -> Self {
        let store = match conn {
            Some(conn) => Store::Redis(conn),
            None => Store::Disabled,
        };

        Self { store }
    }

    /// Process-local denylist, shared between clones of this instance only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Store::Memory(Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    fn key(token: &str) -> String {
        format!("blacklist:{token}")
    }

    /// Mark a token revoked. Best effort: when the store is down the token
    /// simply keeps working until it expires on its own.
    pub async fn revoke(&self, token: &str) {
        match &self.store {
            Store::Redis(conn) => {
                let mut conn = conn.clone();
                if let Err(err) = conn
                    .set_ex::<_, _, ()>(Self::key(token), "revoked", BLACKLIST_TTL_SECS)
                    .await
                {
                    error!("Failed to blacklist token: {err}");
                }
            }
            Store::Memory(map) => {
                let expires_at = Instant::now() + Duration::from_secs(BLACKLIST_TTL_SECS);
                if let Ok(mut map) = map.lock() {
                    map.insert(Self::key(token), expires_at);
                }
            }
            Store::Disabled => {
                warn!("Blacklist store unavailable, revocation skipped");
            }
        }
    }

    /// Whether this exact token string has been revoked. A store failure
    /// disables revocation checking rather than failing every request.
    pub async fn is_revoked(&self, token: &str) -> bool {
        match &self.store {
            Store::Redis(conn) => {
                let mut conn = conn.clone();
                match conn.exists::<_, bool>(Self::key(token)).await {
                    Ok(found) => found,
                    Err(err) => {
                        warn!("Blacklist lookup failed, skipping revocation check: {err}");
                        false
                    }
                }
            }
            Store::Memory(map) => map.lock().map_or(false, |map| {
                map.get(&Self::key(token))
                    .is_some_and(|expires_at| *expires_at > Instant::now())
            }),
            Store::Disabled => false,
        }
    }
}
