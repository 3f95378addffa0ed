//! Admin CRUD for global event map pins.

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
    models::GlobalEvent,
};

const UPSERT: &str = "INSERT INTO global_events (id, location, title, description, date)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (id) DO UPDATE SET
        location = EXCLUDED.location,
        title = EXCLUDED.title,
        description = EXCLUDED.description,
        date = EXCLUDED.date";

async fn save(pool: &PgPool, event: &GlobalEvent) -> Result<(), (StatusCode, String)> {
    sqlx::query(UPSERT)
        .bind(&event.id)
        .bind(&event.location)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.date)
        .execute(pool)
        .await
        .map_err(|err| db_error(&err))?;

    Ok(())
}

#[instrument(skip(pool, actor, headers, event))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut event): Json<GlobalEvent>,
) -> Result<(StatusCode, Json<GlobalEvent>), (StatusCode, String)> {
    if event.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }
    if event.id.is_empty() {
        event.id = fallback_id("evt", &event.location);
    }

    save(&pool, &event).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_CREATE,
        "GlobalEvent",
        &event.id,
        &client_addr(&headers),
        &event.title,
    )
    .await;

    Ok((StatusCode::CREATED, Json(event)))
}

#[instrument(skip(pool, actor, headers, event))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut event): Json<GlobalEvent>,
) -> Result<Json<GlobalEvent>, (StatusCode, String)> {
    event.id = id;

    save(&pool, &event).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "GlobalEvent",
        &event.id,
        &client_addr(&headers),
        &event.title,
    )
    .await;

    Ok(Json(event))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM global_events WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "GlobalEvent",
        &id,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
