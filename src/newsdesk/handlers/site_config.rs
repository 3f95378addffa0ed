//! Singleton page configuration. Both tables hold exactly one row keyed by
//! a fixed id, so updates are plain upserts.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    Json,
};
use sqlx::PgPool;
use tracing::instrument;

use crate::newsdesk::{
    handlers::{audit, auth::middleware::Actor, client_addr, db_error},
    models::{AboutConfig, DonationConfig},
};

const SINGLETON_ID: &str = "primary";

const ABOUT_UPSERT: &str = "INSERT INTO about_config
    (id, title, subtitle, quote, image, badge,
     stat1_label, stat1_value, stat2_label, stat2_value,
     stat3_label, stat3_value, stat4_label, stat4_value,
     impact_section_link, global_anchors_link, global_anchors_text)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
    ON CONFLICT (id) DO UPDATE SET
        title = EXCLUDED.title,
        subtitle = EXCLUDED.subtitle,
        quote = EXCLUDED.quote,
        image = EXCLUDED.image,
        badge = EXCLUDED.badge,
        stat1_label = EXCLUDED.stat1_label,
        stat1_value = EXCLUDED.stat1_value,
        stat2_label = EXCLUDED.stat2_label,
        stat2_value = EXCLUDED.stat2_value,
        stat3_label = EXCLUDED.stat3_label,
        stat3_value = EXCLUDED.stat3_value,
        stat4_label = EXCLUDED.stat4_label,
        stat4_value = EXCLUDED.stat4_value,
        impact_section_link = EXCLUDED.impact_section_link,
        global_anchors_link = EXCLUDED.global_anchors_link,
        global_anchors_text = EXCLUDED.global_anchors_text";

const DONATION_UPSERT: &str = "INSERT INTO donation_config
    (id, qr_code_url, upi_id, bank_name, account_name, account_number,
     ifsc_code, swift_code, message)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (id) DO UPDATE SET
        qr_code_url = EXCLUDED.qr_code_url,
        upi_id = EXCLUDED.upi_id,
        bank_name = EXCLUDED.bank_name,
        account_name = EXCLUDED.account_name,
        account_number = EXCLUDED.account_number,
        ifsc_code = EXCLUDED.ifsc_code,
        swift_code = EXCLUDED.swift_code,
        message = EXCLUDED.message";

/// `PUT /about_config`
#[instrument(skip(pool, actor, headers, config))]
pub async fn update_about(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut config): Json<AboutConfig>,
) -> Result<Json<AboutConfig>, (StatusCode, String)> {
    config.id = SINGLETON_ID.to_string();

    sqlx::query(ABOUT_UPSERT)
        .bind(&config.id)
        .bind(&config.title)
        .bind(&config.subtitle)
        .bind(&config.quote)
        .bind(&config.image)
        .bind(&config.badge)
        .bind(&config.stat1_label)
        .bind(&config.stat1_value)
        .bind(&config.stat2_label)
        .bind(&config.stat2_value)
        .bind(&config.stat3_label)
        .bind(&config.stat3_value)
        .bind(&config.stat4_label)
        .bind(&config.stat4_value)
        .bind(&config.impact_section_link)
        .bind(&config.global_anchors_link)
        .bind(&config.global_anchors_text)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "AboutConfig",
        SINGLETON_ID,
        &client_addr(&headers),
        &config.title,
    )
    .await;

    Ok(Json(config))
}

/// `PUT /donation_config`
#[instrument(skip(pool, actor, headers, config))]
pub async fn update_donation(
    Extension(pool): Extension<PgPool>,
    Extension(actor): Extension<Actor>,
    headers: HeaderMap,
    Json(mut config): Json<DonationConfig>,
) -> Result<Json<DonationConfig>, (StatusCode, String)> {
    config.id = SINGLETON_ID.to_string();

    sqlx::query(DONATION_UPSERT)
        .bind(&config.id)
        .bind(&config.qr_code_url)
        .bind(&config.upi_id)
        .bind(&config.bank_name)
        .bind(&config.account_name)
        .bind(&config.account_number)
        .bind(&config.ifsc_code)
        .bind(&config.swift_code)
        .bind(&config.message)
        .execute(&pool)
        .await
        .map_err(|err| db_error(&err))?;

    audit::record(
        &pool,
        Some(&actor.username),
        audit::ACTION_UPDATE,
        "DonationConfig",
        SINGLETON_ID,
        &client_addr(&headers),
        "",
    )
    .await;

    Ok(Json(config))
}
