//! Admin CRUD for the reading archive.

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
    models::ArchiveBook,
};

const UPSERT: &str = "INSERT INTO archive_books (id, title, author, image, reflection)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (id) DO UPDATE SET
        title = EXCLUDED.title,
        author = EXCLUDED.author,
        image = EXCLUDED.image,
        reflection = EXCLUDED.reflection";

async fn save(pool: &PgPool, book: &ArchiveBook) -> Result<(), (StatusCode, String)> {
    sqlx::query(UPSERT)
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.image)
        .bind(&book.reflection)
        .execute(pool)
        .await
        .map_err(|err| db_error(&err))?;

    Ok(())
}

#[instrument(skip(pool, actor, headers, book))]
pub async fn create(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut book): Json<ArchiveBook>,
) -> Result<(StatusCode, Json<ArchiveBook>), (StatusCode, String)> {
    if book.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "title is required".to_string()));
    }
    if book.id.is_empty() {
        book.id = fallback_id("bk", &book.title);
    }

    save(&pool, &book).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_CREATE,
        "ArchiveBook",
        &book.id,
        &client_addr(&headers),
        &book.title,
    )
    .await;

    Ok((StatusCode::CREATED, Json(book)))
}

#[instrument(skip(pool, actor, headers, book))]
pub async fn update(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut book): Json<ArchiveBook>,
) -> Result<Json<ArchiveBook>, (StatusCode, String)> {
    book.id = id;

    save(&pool, &book).await?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "ArchiveBook",
        &book.id,
        &client_addr(&headers),
        &book.title,
    )
    .await;

    Ok(Json(book))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM archive_books WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "ArchiveBook",
        &id,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
