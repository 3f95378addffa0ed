//! Admin CRUD for advertisement placements.

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
    models::Advertisement,
};

const UPSERT: &str = "INSERT INTO advertisements
    (id, title, image_url, link_url, kind, is_active, position)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (id) DO UPDATE SET
        title = EXCLUDED.title,
        image_url = EXCLUDED.image_url,
        link_url = EXCLUDED.link_url,
        kind = EXCLUDED.kind,
        is_active = EXCLUDED.is_active,
        position = EXCLUDED.position";

async fn save(pool: &PgPool, ad: &Advertisement) -> Result<(), (StatusCode, String)> {
    sqlx::query(UPSERT)
        .bind(&ad.id)
        .bind(&ad.title)
        .bind(&ad.image_url)
        .bind(&ad.link_url)
        .bind(&ad.kind)
        .bind(ad.is_active)
        .bind(&ad.position)
        .execute(pool)
        .await
        .map_err(|err| db_error(&err))?;

    Ok(())
}

#[instrument(skip(pool, actor, headers, ad))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut ad): Json<Advertisement>,
) -> Result<(StatusCode, Json<Advertisement>), (StatusCode, String)> {
    if ad.id.is_empty() {
        // Ad titles repeat across campaigns, so always mint a unique id.
        ad.id = fallback_id("ad", "");
    }
    if ad.kind.is_empty() {
        ad.kind = "banner".to_string();
    }

    save(&pool, &ad).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_CREATE,
        "Advertisement",
        &ad.id,
        &client_addr(&headers),
        &ad.title,
    )
    .await;

    Ok((StatusCode::CREATED, Json(ad)))
}

#[instrument(skip(pool, actor, headers, ad))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut ad): Json<Advertisement>,
) -> Result<Json<Advertisement>, (StatusCode, String)> {
    ad.id = id;
    if ad.kind.is_empty() {
        ad.kind = "banner".to_string();
    }

    save(&pool, &ad).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "Advertisement",
        &ad.id,
        &client_addr(&headers),
        &ad.title,
    )
    .await;

    Ok(Json(ad))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM advertisements WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "Advertisement",
        &id,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
