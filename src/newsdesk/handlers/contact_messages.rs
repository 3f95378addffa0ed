//! Contact messages: public submission plus admin inbox and moderation.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::instrument;

use crate::newsdesk::{
    handlers::{audit, auth::middleware::Actor, client_addr, db_error, valid_email},
    models::ContactMessage,
};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SubmitRequest {
    pub name: String,
    pub email: String,
    pub category: String,
    pub message: String,
}

impl Default for SubmitRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            category: "general".to_string(),
            message: String::new(),
        }
    }
}

/// `POST /contact_messages` (public, unauthenticated).
#[instrument(skip(pool, headers, body))]
pub async fn submit(
    Extension(pool): Extension<PgPool>,
    headers: HeaderMap,
    Json(body): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, String)> {
    if body.name.trim().is_empty() || body.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "name and message are required".to_string(),
        ));
    }
    if !valid_email(&body.email) {
        return Err((StatusCode::BAD_REQUEST, "invalid email".to_string()));
    }

    let date = Utc::now().to_rfc3339();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO contact_messages (name, email, category, message, date)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&body.name)
    .bind(&body.email)
    .bind(&body.category)
    .bind(&body.message)
    .bind(&date)
    .fetch_one(&pool)
    .await
    .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        None,
        audit::ACTION_CREATE,
        "ContactMessage",
        &id.to_string(),
        &client_addr(&headers),
        &body.category,
    )
    .await;

    Ok((StatusCode::CREATED, Json(json!({ "message": "Received" }))))
}

/// `GET /contact_messages` (admin), newest first.
#[instrument(skip(pool))]
pub async fn list(
    Extension(pool): Extension<PgPool>,
) -> Result<Json<Vec<ContactMessage>>, (StatusCode, String)> {
    let messages: Vec<ContactMessage> =
        sqlx::query_as("SELECT * FROM contact_messages ORDER BY date DESC")
            .fetch_all(&pool)
            .await
            .map_err(|err| db_error(&err))?;

    Ok(Json(messages))
}

#[instrument(skip(pool, actor, headers))]
pub async fn remove(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, String)> {
    sqlx::query("DELETE FROM contact_messages WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_DELETE,
        "ContactMessage",
        &id.to_string(),
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(json!({ "message": "Deleted" })))
}
