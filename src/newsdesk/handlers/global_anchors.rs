//! Admin CRUD for partner network anchors.

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
    models::GlobalAnchor,
};

const UPSERT: &str = "INSERT INTO global_anchors (id, name, icon, link)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (id) DO UPDATE SET
        name = EXCLUDED.name,
        icon = EXCLUDED.icon,
        link = EXCLUDED.link";

async fn save(pool: &PgPool, anchor: &GlobalAnchor) -> Result<(), (StatusCode, String)> {
    sqlx::query(UPSERT)
        .bind(&anchor.id)
        .bind(&anchor.name)
        .bind(&anchor.icon)
        .bind(&anchor.link)
        .execute(pool)
        .await
        .map_err(|err| db_error(&err))?;

    Ok(())
}

#[instrument(skip(pool, actor, headers, anchor))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut anchor): Json<GlobalAnchor>,
) -> Result<(StatusCode, Json<GlobalAnchor>), (StatusCode, String)> {
    if anchor.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".to_string()));
    }
    if anchor.id.is_empty() {
        anchor.id = fallback_id("anchor", &anchor.name);
    }

    save(&pool, &anchor).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_CREATE,
        "GlobalAnchor",
        &anchor.id,
        &client_addr(&headers),
        &anchor.name,
    )
    .await;

    Ok((StatusCode::CREATED, Json(anchor)))
}

#[instrument(skip(pool, actor, headers, anchor))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut anchor): Json<GlobalAnchor>,
) -> Result<Json<GlobalAnchor>, (StatusCode, String)> {
    anchor.id = id;

    save(&pool, &anchor).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "GlobalAnchor",
        &anchor.id,
        &client_addr(&headers),
        &anchor.name,
    )
    .await;

    Ok(Json(anchor))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM global_anchors WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "GlobalAnchor",
        &id,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
