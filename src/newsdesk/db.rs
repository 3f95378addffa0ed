//! Postgres pool setup, schema bootstrap and first-boot seeding.

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

/// Statements are idempotent so every instance can run them at startup.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS audit_logs (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL,
        action TEXT NOT NULL,
        entity TEXT NOT NULL,
        entity_id TEXT NOT NULL DEFAULT '',
        ip_address TEXT NOT NULL DEFAULT '',
        timestamp TEXT NOT NULL,
        details TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        category TEXT NOT NULL DEFAULT '',
        title TEXT NOT NULL,
        excerpt TEXT NOT NULL DEFAULT '',
        author TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL DEFAULT '',
        read_time TEXT NOT NULL DEFAULT '',
        image TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL DEFAULT '',
        sidenote TEXT NOT NULL DEFAULT '',
        language TEXT NOT NULL DEFAULT 'en'
    )",
    "CREATE TABLE IF NOT EXISTS headlines (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        time TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS photos (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT '',
        image_url TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL DEFAULT '',
        location TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        dispatch_id TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS impact_stats (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        icon TEXT NOT NULL DEFAULT '',
        stats TEXT NOT NULL DEFAULT '',
        color TEXT NOT NULL DEFAULT '',
        reference TEXT NOT NULL DEFAULT '',
        link TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS global_events (
        id TEXT PRIMARY KEY,
        location TEXT NOT NULL DEFAULT '',
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS timeline_items (
        id TEXT PRIMARY KEY,
        year TEXT NOT NULL DEFAULT '',
        title TEXT NOT NULL,
        event TEXT NOT NULL DEFAULT '',
        ref_id TEXT NOT NULL DEFAULT '',
        image TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS archive_books (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        author TEXT NOT NULL DEFAULT '',
        image TEXT NOT NULL DEFAULT '',
        reflection TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS global_anchors (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        icon TEXT NOT NULL DEFAULT '',
        link TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS advertisements (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL DEFAULT '',
        image_url TEXT NOT NULL DEFAULT '',
        link_url TEXT NOT NULL DEFAULT '',
        kind TEXT NOT NULL DEFAULT 'banner',
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        position TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS perspectives (
        id TEXT PRIMARY KEY,
        article_id TEXT NOT NULL DEFAULT '',
        name TEXT NOT NULL,
        email TEXT NOT NULL DEFAULT '',
        content TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS contact_messages (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT '',
        message TEXT NOT NULL,
        date TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS about_config (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL DEFAULT '',
        subtitle TEXT NOT NULL DEFAULT '',
        quote TEXT NOT NULL DEFAULT '',
        image TEXT NOT NULL DEFAULT '',
        badge TEXT NOT NULL DEFAULT '',
        stat1_label TEXT NOT NULL DEFAULT '',
        stat1_value TEXT NOT NULL DEFAULT '',
        stat2_label TEXT NOT NULL DEFAULT '',
        stat2_value TEXT NOT NULL DEFAULT '',
        stat3_label TEXT NOT NULL DEFAULT '',
        stat3_value TEXT NOT NULL DEFAULT '',
        stat4_label TEXT NOT NULL DEFAULT '',
        stat4_value TEXT NOT NULL DEFAULT '',
        impact_section_link TEXT NOT NULL DEFAULT '',
        global_anchors_link TEXT NOT NULL DEFAULT '',
        global_anchors_text TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS donation_config (
        id TEXT PRIMARY KEY,
        qr_code_url TEXT NOT NULL DEFAULT '',
        upi_id TEXT NOT NULL DEFAULT '',
        bank_name TEXT NOT NULL DEFAULT '',
        account_name TEXT NOT NULL DEFAULT '',
        account_number TEXT NOT NULL DEFAULT '',
        ifsc_code TEXT NOT NULL DEFAULT '',
        swift_code TEXT NOT NULL DEFAULT '',
        message TEXT NOT NULL DEFAULT ''
    )",
    // Full-text indexes backing /search
    "CREATE INDEX IF NOT EXISTS idx_articles_fulltext ON articles
        USING gin(to_tsvector('english', title || ' ' || excerpt || ' ' || content))",
    "CREATE INDEX IF NOT EXISTS idx_archive_books_fulltext ON archive_books
        USING gin(to_tsvector('english', title || ' ' || author || ' ' || reflection))",
    "CREATE INDEX IF NOT EXISTS idx_articles_date ON articles(date DESC)",
    "CREATE INDEX IF NOT EXISTS idx_contact_messages_date ON contact_messages(date DESC)",
];

/// Connect to the database.
///
/// # Errors
/// Returns an error if the pool cannot be established.
pub async fn connect(dsn: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .min_connections(1)
        .max_connections(10)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")
}

/// Apply the idempotent schema statements.
///
/// # Errors
/// Returns an error if any statement fails.
pub async fn bootstrap(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Schema bootstrap failed: {statement}"))?;
    }

    Ok(())
}

/// Seed the admin credential on first boot.
///
/// The credential is created only when the users table is empty; password
/// changes go through an out-of-band admin-management path, not this server.
///
/// # Errors
/// Returns an error if the database is unreachable or hashing fails.
pub async fn seed_admin(pool: &PgPool, admin_secret: &SecretString) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    if count > 0 {
        return Ok(());
    }

    let hash = bcrypt::hash(admin_secret.expose_secret(), bcrypt::DEFAULT_COST)
        .context("Failed to hash admin password")?;

    sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
        .bind("admin")
        .bind(&hash)
        .execute(pool)
        .await
        .context("Failed to seed admin user")?;

    info!("Admin user seeded");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::{PgConnectOptions, PgSslMode};

    fn unreachable_pool() -> PgPool {
        let options = PgConnectOptions::new()
            .host("127.0.0.1")
            .port(1)
            .username("invalid")
            .database("invalid")
            .ssl_mode(PgSslMode::Disable);
        PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy_with(options)
    }

    #[test]
    fn schema_covers_auth_tables() {
        let joined = SCHEMA.join("\n");
        assert!(joined.contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(joined.contains("CREATE TABLE IF NOT EXISTS audit_logs"));
        assert!(joined.contains("idx_articles_fulltext"));
        assert!(joined.contains("idx_archive_books_fulltext"));
    }

    #[tokio::test]
    async fn bootstrap_fails_without_db() {
        let pool = unreachable_pool();
        assert!(bootstrap(&pool).await.is_err());
    }

    #[tokio::test]
    async fn seed_admin_fails_without_db() {
        let pool = unreachable_pool();
        let secret = SecretString::from("hunter2".to_string());
        assert!(seed_admin(&pool, &secret).await.is_err());
    }
}
