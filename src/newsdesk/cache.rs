//! Redis connection setup and the cache-aside search cache.

use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client,
};
use std::time::Duration;
use tracing::{debug, warn};

/// Search results are cached for ten minutes.
const SEARCH_CACHE_TTL_SECS: u64 = 10 * 60;

/// Connect to Redis, returning `None` when it is unreachable.
///
/// The server keeps running without Redis: revocation checks, rate limits
/// and the search cache are all disabled in that case.
pub async fn init_redis(redis_url: &str) -> Option<ConnectionManager> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = match Client::open(redis_url) {
        Ok(client) => client,
        Err(err) => {
            warn!("Invalid redis URL, caching disabled: {err}");
            return None;
        }
    };

    match client.get_connection_manager_with_config(config).await {
        Ok(manager) => Some(manager),
        Err(err) => {
            warn!("Redis not reachable, caching disabled: {err}");
            None
        }
    }
}

/// Cache-aside store for serialized search responses.
#[derive(Clone)]
pub struct SearchCache {
    conn: Option<ConnectionManager>,
}

impl SearchCache {
    #[must_use]
    pub fn new(conn: Option<ConnectionManager>) -> Self {
        Self { conn }
    }

    fn key(query: &str, lang: &str) -> String {
        format!("search:{query}:{lang}")
    }

    pub async fn get(&self, query: &str, lang: &str) -> Option<String> {
        let mut conn = self.conn.clone()?;
        match conn.get::<_, Option<String>>(Self::key(query, lang)).await {
            Ok(hit) => hit,
            Err(err) => {
                debug!("Search cache lookup failed: {err}");
                None
            }
        }
    }

    /// Best effort; a failed write only costs the next caller a database hit.
    pub async fn put(&self, query: &str, lang: &str, body: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        if let Err(err) = conn
            .set_ex::<_, _, ()>(Self::key(query, lang), body, SEARCH_CACHE_TTL_SECS)
            .await
        {
            debug!("Search cache write failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_includes_query_and_lang() {
        assert_eq!(SearchCache::key("press freedom", "en"), "search:press freedom:en");
        assert_eq!(SearchCache::key("q", ""), "search:q:");
    }

    #[tokio::test]
    async fn disabled_cache_misses_and_swallows_writes() {
        let cache = SearchCache::new(None);
        assert!(cache.get("q", "en").await.is_none());
        cache.put("q", "en", "{}").await;
    }
}
