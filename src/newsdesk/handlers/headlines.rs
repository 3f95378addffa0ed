//! Admin CRUD for ticker headlines.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::instrument;

use crate::newsdesk::{
    handlers::{audit, auth::middleware::Actor, client_addr, db_error, fallback_id},
    models::Headline,
};

const UPSERT: &str = "INSERT INTO headlines (id, title, time)
    VALUES ($1, $2, $3)
    ON CONFLICT (id) DO UPDATE SET title = EXCLUDED.title, time = EXCLUDED.time";

async fn save(pool: &PgPool, headline: &Headline) -> Result<(), (StatusCode, String)> {
    sqlx::query(UPSERT)
        .bind(&headline.id)
        .bind(&headline.title)
        .bind(&headline.time)
        .execute(pool)
        .await
        .map_err(|err| db_error(&err))?;

    Ok(())
}

#[instrument(skip(pool, actor, headers, headline))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut headline): Json<Headline>,
) -> Result<(StatusCode, Json<Headline>), (StatusCode, String)> {
    if headline.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }
    if headline.id.is_empty() {
        headline.id = fallback_id("hl", &headline.time);
    }

    save(&pool, &headline).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_CREATE,
        "Headline",
        &headline.id,
        &client_addr(&headers),
        &headline.title,
    )
    .await;

    Ok((StatusCode::CREATED, Json(headline)))
}

#[instrument(skip(pool, actor, headers, headline))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut headline): Json<Headline>,
) -> Result<Json<Headline>, (StatusCode, String)> {
    headline.id = id;

    save(&pool, &headline).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "Headline",
        &headline.id,
        &client_addr(&headers),
        &headline.title,
    )
    .await;

    Ok(Json(headline))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM headlines WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "Headline",
        &id,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
