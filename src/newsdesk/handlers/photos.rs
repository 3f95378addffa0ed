//! Admin CRUD for dispatch photos.

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
    models::Photo,
};

const UPSERT: &str = "INSERT INTO photos
    (id, title, category, image_url, date, location, description, dispatch_id)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (id) DO UPDATE SET
        title = EXCLUDED.title,
        category = EXCLUDED.category,
        image_url = EXCLUDED.image_url,
        date = EXCLUDED.date,
        location = EXCLUDED.location,
        description = EXCLUDED.description,
        dispatch_id = EXCLUDED.dispatch_id";

async fn save(pool: &PgPool, photo: &Photo) -> Result<(), (StatusCode, String)> {
    sqlx::query(UPSERT)
        .bind(&photo.id)
        .bind(&photo.title)
        .bind(&photo.category)
        .bind(&photo.image_url)
        .bind(&photo.date)
        .bind(&photo.location)
        .bind(&photo.description)
        .bind(&photo.dispatch_id)
        .execute(pool)
        .await
        .map_err(|err| db_error(&err))?;

    Ok(())
}

#[instrument(skip(pool, actor, headers, photo))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut photo): Json<Photo>,
) -> Result<(StatusCode, Json<Photo>), (StatusCode, String)> {
    if photo.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }
    if photo.id.is_empty() {
        photo.id = fallback_id("ph", &photo.dispatch_id);
    }

    save(&pool, &photo).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_CREATE,
        "Photo",
        &photo.id,
        &client_addr(&headers),
        &photo.title,
    )
    .await;

    Ok((StatusCode::CREATED, Json(photo)))
}

#[instrument(skip(pool, actor, headers, photo))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut photo): Json<Photo>,
) -> Result<Json<Photo>, (StatusCode, String)> {
    photo.id = id;

    save(&pool, &photo).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "Photo",
        &photo.id,
        &client_addr(&headers),
        &photo.title,
    )
    .await;

    Ok(Json(photo))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM photos WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "Photo",
        &id,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
