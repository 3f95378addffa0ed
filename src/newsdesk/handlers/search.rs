//! Public full-text search over articles and archive books, cache-aside
//! through Redis with an `X-Cache` header reporting hit or miss.

use axum::{
    extract::{Extension, Query},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode},
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;

use crate::newsdesk::{
    cache::SearchCache,
    handlers::db_error,
    models::{ArchiveBook, Article},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub q: String,
    pub lang: String,
}

const ARTICLE_QUERY: &str = "SELECT * FROM articles
    WHERE to_tsvector('english', title || ' ' || excerpt || ' ' || content)
        @@ plainto_tsquery('english', $1)
    AND ($2 = '' OR language = $2)
    ORDER BY date DESC
    LIMIT 50";

const BOOK_QUERY: &str = "SELECT * FROM archive_books
    WHERE to_tsvector('english', title || ' ' || author || ' ' || reflection)
        @@ plainto_tsquery('english', $1)
    LIMIT 50";

/// `GET /search?q=...&lang=...`
///
/// # Errors
/// `StatusCode::INTERNAL_SERVER_ERROR` when the database query fails.
#[instrument(skip(pool, cache))]
pub async fn search(
    Extension(pool): Extension<PgPool>,
    Extension(cache): Extension<SearchCache>,
    Query(params): Query<SearchParams>,
) -> Result<(HeaderMap, String), (StatusCode, String)> {
    let query = params.q.trim();

    if query.is_empty() {
        let body = json!({ "articles": [], "books": [] }).to_string();
        return Ok((response_headers("MISS"), body));
    }

    if let Some(cached) = cache.get(query, &params.lang).await {
        return Ok((response_headers("HIT"), cached));
    }

    let articles: Vec<Article> = sqlx::query_as(ARTICLE_QUERY)
        .bind(query)
        .bind(&params.lang)
        .fetch_all(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    let books: Vec<ArchiveBook> = sqlx::query_as(BOOK_QUERY)
        .bind(query)
        .fetch_all(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    let body = json!({ "articles": articles, "books": books }).to_string();

    cache.put(query, &params.lang, &body).await;

    Ok((response_headers("MISS"), body))
}

fn response_headers(cache_status: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("x-cache", HeaderValue::from_static(cache_status));
    headers
}
