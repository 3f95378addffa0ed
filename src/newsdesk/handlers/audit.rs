//! Append-only audit trail for logins, logouts and admin mutations.
//!
//! Writes are best effort: a failed insert is logged and never fails the
//! operation that triggered it.

use chrono::Utc;
use sqlx::PgPool;
use tracing::error;

pub const ACTION_LOGIN: &str = "LOGIN";
pub const ACTION_LOGOUT: &str = "LOGOUT";
pub const ACTION_CREATE: &str = "CREATE";
pub const ACTION_UPDATE: &str = "UPDATE";
pub const ACTION_DELETE: &str = "DELETE";

pub async fn record(
    pool: &PgPool,
    actor: Option<&str>,
    action: &str,
    entity: &str,
    entity_id: &str,
    client: &str,
    details: &str,
) {
    let username = actor.unwrap_or("anonymous");
    let timestamp = Utc::now().to_rfc3339();

    let result = sqlx::query(
        "INSERT INTO audit_logs (username, action, entity, entity_id, ip_address, timestamp, details)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(username)
    .bind(action)
    .bind(entity)
    .bind(entity_id)
    .bind(client)
    .bind(&timestamp)
    .bind(details)
    .execute(pool)
    .await;

    if let Err(err) = result {
        error!("Failed to write audit record for {action} {entity}/{entity_id}: {err}");
    }
}
