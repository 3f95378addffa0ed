use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware,
    routing::{delete, get, post, put},
    Extension, Router,
};
use secrecy::SecretString;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;

pub mod cache;
pub mod db;
pub mod handlers;
pub mod models;

use cache::SearchCache;
use handlers::auth::{
    blacklist::TokenBlacklist,
    middleware::authorize,
    rate_limit::{limit_mutations, RateLimiter},
    session::SessionAuthority,
};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

/// Everything the server needs at startup, resolved by the CLI layer.
#[derive(Debug)]
pub struct ServerOptions {
    pub port: u16,
    pub dsn: String,
    pub redis_url: String,
    pub secret: SecretString,
    pub admin_secret: SecretString,
    pub allowed_origins: Vec<String>,
    pub production: bool,
}

/// Shared service handles injected into the router via extensions.
///
/// The session authority holds no mutable state; all shared state lives in
/// Postgres and Redis so any number of instances can serve concurrently.
#[derive(Clone)]
pub struct AppServices {
    pub pool: PgPool,
    pub authority: Arc<SessionAuthority>,
    pub blacklist: TokenBlacklist,
    pub limiter: RateLimiter,
    pub cache: SearchCache,
}

/// Connect to the stores, seed the admin credential and serve until ctrl-c.
///
/// # Errors
/// Returns an error if the database is unreachable or the listener fails.
pub async fn new(options: ServerOptions) -> Result<()> {
    let pool = db::connect(&options.dsn).await?;
    db::bootstrap(&pool).await?;
    db::seed_admin(&pool, &options.admin_secret).await?;

    // Revocation, rate limits and the search cache degrade gracefully
    // when Redis is down; only the database is a hard dependency.
    let redis = cache::init_redis(&options.redis_url).await;

    let services = AppServices {
        pool,
        authority: Arc::new(SessionAuthority::new(&options.secret, options.production)),
        blacklist: TokenBlacklist::new(redis.clone()),
        limiter: RateLimiter::new(redis.clone()),
        cache: SearchCache::new(redis),
    };

    let app = router(services, &options.allowed_origins)?;

    let listener = TcpListener::bind(format!("::0:{}", options.port)).await?;

    info!("Listening on [::]:{}", options.port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Build the application router.
///
/// # Errors
/// Returns an error if a configured CORS origin is not a valid header value.
pub fn router(services: AppServices, allowed_origins: &[String]) -> Result<Router> {
    let cors = cors_layer(allowed_origins)?;

    // Admin mutations: authorize + 30/min per client, each one audited.
    let mutations = Router::new()
        .route("/articles", post(handlers::articles::create))
        .route(
            "/articles/:id",
            put(handlers::articles::update).delete(handlers::articles::remove),
        )
        .route("/headlines", post(handlers::headlines::create))
        .route(
            "/headlines/:id",
            put(handlers::headlines::update).delete(handlers::headlines::remove),
        )
        .route("/photos", post(handlers::photos::create))
        .route(
            "/photos/:id",
            put(handlers::photos::update).delete(handlers::photos::remove),
        )
        .route("/impacts", post(handlers::impacts::create))
        .route(
            "/impacts/:id",
            put(handlers::impacts::update).delete(handlers::impacts::remove),
        )
        .route("/global_events", post(handlers::global_events::create))
        .route(
            "/global_events/:id",
            put(handlers::global_events::update).delete(handlers::global_events::remove),
        )
        .route("/timeline", post(handlers::timeline::create))
        .route(
            "/timeline/:id",
            put(handlers::timeline::update).delete(handlers::timeline::remove),
        )
        .route("/archive_books", post(handlers::archive_books::create))
        .route(
            "/archive_books/:id",
            put(handlers::archive_books::update).delete(handlers::archive_books::remove),
        )
        .route("/global_anchors", post(handlers::global_anchors::create))
        .route(
            "/global_anchors/:id",
            put(handlers::global_anchors::update).delete(handlers::global_anchors::remove),
        )
        .route("/ads", post(handlers::ads::create))
        .route(
            "/ads/:id",
            put(handlers::ads::update).delete(handlers::ads::remove),
        )
        .route("/about_config", put(handlers::site_config::update_about))
        .route(
            "/donation_config",
            put(handlers::site_config::update_donation),
        )
        .route(
            "/perspectives/:id",
            delete(handlers::perspectives::remove),
        )
        .route(
            "/contact_messages/:id",
            delete(handlers::contact_messages::remove),
        )
        .route_layer(middleware::from_fn(limit_mutations));

    let admin = Router::new()
        .route("/admin/verify", get(handlers::auth::verify))
        .route("/contact_messages", get(handlers::contact_messages::list))
        .merge(mutations)
        .route_layer(middleware::from_fn(authorize));

    let app = Router::new()
        .route("/admin/login", post(handlers::auth::login))
        .route("/admin/refresh", post(handlers::auth::refresh))
        .route("/admin/logout", post(handlers::auth::logout))
        .route("/contact_messages", post(handlers::contact_messages::submit))
        .route("/search", get(handlers::search::search))
        .merge(admin)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(services.pool.clone()))
                .layer(Extension(services.authority))
                .layer(Extension(services.blacklist))
                .layer(Extension(services.limiter))
                .layer(Extension(services.cache)),
        )
        .route("/health", get(handlers::health).options(handlers::health));

    Ok(app)
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    // The browser admin UI sends credentials (the refresh cookie), so the
    // origin list must be explicit; wildcard origins are rejected by browsers
    // when credentials are allowed.
    let mut origins = vec![
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:5173"),
    ];
    for origin in allowed_origins {
        origins.push(
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin: {origin}"))?,
        );
    }

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-admin-token"),
        ])
        .allow_credentials(true)
        .allow_origin(origins))
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, ?headers, request_id)
}
