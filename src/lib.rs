pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod rate_limiting;
pub mod security;
pub mod validation;

use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

use config::Settings;

/// Form posts are small; reject anything larger
const MAX_BODY_BYTES: usize = 64 * 1024;

// Application state
pub struct AppState {
    pub db_pool: SqlitePool,
}

/// Open the database, run the bootstrap seeder (unless disabled) and build
/// the router. A seeding error aborts startup.
pub async fn create_app(settings: &Settings) -> Result<Router> {
    let db_pool = db::init_db(&settings.database).await?;

    if settings.seed {
        let report = db::seed::seed_database(&db_pool)
            .await
            .context("Bootstrap seeding failed")?;
        info!(
            users_created = report.users_created,
            books_inserted = report.books_inserted,
            "bootstrap seeding finished"
        );
    } else {
        info!("bootstrap seeding disabled");
    }

    create_router(db_pool)
}

// Build the router over an initialized database
pub fn create_router(db_pool: SqlitePool) -> Result<Router> {
    let state = Arc::new(AppState { db_pool });

    // Shared limiter for credential posts, keyed on the peer IP
    let governor_config = GovernorConfigBuilder::default()
        .per_second(rate_limiting::REPLENISH_SECONDS)
        .burst_size(rate_limiting::BURST_SIZE)
        .finish()
        .context("Invalid rate limit configuration")?;
    let credential_limit = GovernorLayer::new(Arc::new(governor_config))
        .error_handler(rate_limiting::rate_limit_error_handler);

    let router = Router::new()
        // Public catalog
        .route("/", get(handlers::books::catalog_page))
        .route("/books/{isbn}", get(handlers::books::book_page))
        .route("/api/books", get(handlers::books::list_books_json))
        .route("/api/books/{isbn}", get(handlers::books::get_book_json))

        // Auth routes (POSTs are rate limited)
        .route(
            "/login",
            get(handlers::auth::login_page)
                .merge(post(handlers::auth::login_submit).layer(credential_limit.clone())),
        )
        .route(
            "/register",
            get(handlers::auth::register_page)
                .merge(post(handlers::auth::register_submit).layer(credential_limit)),
        )
        .route("/logout", post(handlers::auth::logout))

        // Admin routes (require an ADMIN session)
        .route("/admin", get(handlers::admin::admin_page))
        .route("/admin/books", post(handlers::admin::create_book))
        .route("/admin/books/{id}", delete(handlers::admin::delete_book))
        .route("/admin/cleanup-sessions", post(handlers::admin::cleanup_sessions))

        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn(security::security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}
