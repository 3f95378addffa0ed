//! Admin CRUD for impact statistics shown on the about page.

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
    models::ImpactStat,
};

const UPSERT: &str = "INSERT INTO impact_stats
    (id, title, description, icon, stats, color, reference, link)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (id) DO UPDATE SET
        title = EXCLUDED.title,
        description = EXCLUDED.description,
        icon = EXCLUDED.icon,
        stats = EXCLUDED.stats,
        color = EXCLUDED.color,
        reference = EXCLUDED.reference,
        link = EXCLUDED.link";

async fn save(pool: &PgPool, stat: &ImpactStat) -> Result<(), (StatusCode, String)> {
    sqlx::query(UPSERT)
        .bind(&stat.id)
        .bind(&stat.title)
        .bind(&stat.description)
        .bind(&stat.icon)
        .bind(&stat.stats)
        .bind(&stat.color)
        .bind(&stat.reference)
        .bind(&stat.link)
        .execute(pool)
        .await
        .map_err(|err| db_error(&err))?;

    Ok(())
}

#[instrument(skip(pool, actor, headers, stat))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut stat): Json<ImpactStat>,
) -> Result<(StatusCode, Json<ImpactStat>), (StatusCode, String)> {
    if stat.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }
    if stat.id.is_empty() {
        stat.id = fallback_id("imp", &stat.reference);
    }

    save(&pool, &stat).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_CREATE,
        "ImpactStat",
        &stat.id,
        &client_addr(&headers),
        &stat.title,
    )
    .await;

    Ok((StatusCode::CREATED, Json(stat)))
}

#[instrument(skip(pool, actor, headers, stat))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut stat): Json<ImpactStat>,
) -> Result<Json<ImpactStat>, (StatusCode, String)> {
    stat.id = id;

    save(&pool, &stat).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "ImpactStat",
        &stat.id,
        &client_addr(&headers),
        &stat.title,
    )
    .await;

    Ok(Json(stat))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM impact_stats WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "ImpactStat",
        &id,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
