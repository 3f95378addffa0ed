//! Admin CRUD for career timeline entries.

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
    models::TimelineItem,
};

const UPSERT: &str = "INSERT INTO timeline_items (id, year, title, event, ref_id, image)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (id) DO UPDATE SET
        year = EXCLUDED.year,
        title = EXCLUDED.title,
        event = EXCLUDED.event,
        ref_id = EXCLUDED.ref_id,
        image = EXCLUDED.image";

async fn save(pool: &PgPool, item: &TimelineItem) -> Result<(), (StatusCode, String)> {
    sqlx::query(UPSERT)
        .bind(&item.id)
        .bind(&item.year)
        .bind(&item.title)
        .bind(&item.event)
        .bind(&item.ref_id)
        .bind(&item.image)
        .execute(pool)
        .await
        .map_err(|err| db_error(&err))?;

    Ok(())
}

#[instrument(skip(pool, actor, headers, item))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut item): Json<TimelineItem>,
) -> Result<(StatusCode, Json<TimelineItem>), (StatusCode, String)> {
    if item.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }
    if item.id.is_empty() {
        item.id = fallback_id("tl", &item.year);
    }

    save(&pool, &item).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_CREATE,
        "TimelineItem",
        &item.id,
        &client_addr(&headers),
        &item.title,
    )
    .await;

    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(pool, actor, headers, item))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut item): Json<TimelineItem>,
) -> Result<Json<TimelineItem>, (StatusCode, String)> {
    item.id = id;

    save(&pool, &item).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "TimelineItem",
        &item.id,
        &client_addr(&headers),
        &item.title,
    )
    .await;

    Ok(Json(item))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM timeline_items WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "TimelineItem",
        &id,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
