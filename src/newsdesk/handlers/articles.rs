//! Admin CRUD for articles.

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
    models::Article,
};

const UPSERT: &str = "INSERT INTO articles
    (id, category, title, excerpt, author, date, read_time, image, content, sidenote, language)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT (id) DO UPDATE SET
        category = EXCLUDED.category,
        title = EXCLUDED.title,
        excerpt = EXCLUDED.excerpt,
        author = EXCLUDED.author,
        date = EXCLUDED.date,
        read_time = EXCLUDED.read_time,
        image = EXCLUDED.image,
        content = EXCLUDED.content,
        sidenote = EXCLUDED.sidenote,
        language = EXCLUDED.language";

async fn save(pool: &PgPool, article: &Article) -> Result<(), (StatusCode, String)> {
    sqlx::query(UPSERT)
        .bind(&article.id)
        .bind(&article.category)
        .bind(&article.title)
        .bind(&article.excerpt)
        .bind(&article.author)
        .bind(&article.date)
        .bind(&article.read_time)
        .bind(&article.image)
        .bind(&article.content)
        .bind(&article.sidenote)
        .bind(&article.language)
        .execute(pool)
        .await
        .map_err(|err| db_error(&err))?;

    Ok(())
}

#[instrument(skip(pool, actor, headers, article))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut article): Json<Article>,
) -> Result<(StatusCode, Json<Article>), (StatusCode, String)> {
    if article.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }
    if article.id.is_empty() {
        article.id = fallback_id("auto", &article.title);
    }
    if article.language.is_empty() {
        article.language = "en".to_string();
    }

    save(&pool, &article).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_CREATE,
        "Article",
        &article.id,
        &client_addr(&headers),
        &article.title,
    )
    .await;

    Ok((StatusCode::CREATED, Json(article)))
}

#[instrument(skip(pool, actor, headers, article))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut article): Json<Article>,
) -> Result<Json<Article>, (StatusCode, String)> {
    article.id = id;
    if article.language.is_empty() {
        article.language = "en".to_string();
    }

    save(&pool, &article).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "Article",
        &article.id,
        &client_addr(&headers),
        &article.title,
    )
    .await;

    Ok(Json(article))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "Article",
        &id,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
