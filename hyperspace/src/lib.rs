//! # HyperSpace: a self-hosted start page
//!
//! HyperSpace serves a personal dashboard of links arranged in groups, together with the REST
//! API that edits it. Links carry an icon, a URL and a rich-text note; groups and links are
//! ordered by an explicit rank, and the whole dashboard can be exported to and imported from a
//! zip bundle.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL for persistence. Uploaded icons live in a directory on disk.
//!
//! - The **API layer** ([`api`]) exposes CRUD endpoints for groups, links and configuration
//!   rows, an icon upload endpoint, the bundle endpoints and the rendered dashboard.
//! - The **database layer** ([`db`]) uses the repository pattern: one repository per table.
//! - The **upload store** ([`storage`]) names and stores icon files.
//! - The **editor** ([`editor`]) keeps a working copy of the group tree, applies reorders and
//!   edits to it and mirrors them to a [`editor::DashboardApi`]. The same trait is implemented
//!   over HTTP ([`client`]) for the command-line client and directly over the database for the
//!   server's bundle endpoints.
//! - The **bundle** routine ([`bundle`]) packs and unpacks the zip format.
//! - The **dashboard** ([`dashboard`]) renders the start page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use hyperspace::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = hyperspace::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     hyperspace::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations run automatically on startup. They can also be run by hand:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! hyperspace::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod bundle;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod editor;
pub mod errors;
mod openapi;
pub mod storage;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::dashboard::DashboardRenderer;
use crate::openapi::ApiDoc;
use crate::storage::{LocalUploadStore, UploadStore};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    Json, Router, http,
    routing::{delete, get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ConfigurationId, GroupId, LinkId};

/// Room for multipart boundaries and headers on top of a file size limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .uploads(Arc::new(LocalUploadStore::new("uploads", NamingScheme::Timestamped)))
///     .dashboard(Arc::new(DashboardRenderer::new()?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub uploads: Arc<dyn UploadStore>,
    pub dashboard: Arc<DashboardRenderer>,
}

/// Get the HyperSpace database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

#[instrument(skip_all)]
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let settings = &config.database.pool;
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(settings.idle_timeout())
        .max_lifetime(settings.max_lifetime())
        .connect_with(config.database.connect_options()?)
        .await?;

    migrator().run(&pool).await?;
    info!("Database migrations applied");
    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    // tower-http rejects `*` inside an origin list, so a wildcard anywhere allows any origin
    let allow_origin = if config.cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT, http::Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE])
        .expose_headers(vec![http::header::CONTENT_DISPOSITION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// Besides the API this serves stored uploads under `/uploads`, the OpenAPI document at
/// `/api-docs/openapi.json` with a UI at `/docs`, and `/healthz`.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let upload_limit = state.config.uploads.max_file_size.saturating_add(MULTIPART_OVERHEAD);
    let bundle_limit = state.config.uploads.max_bundle_size.saturating_add(MULTIPART_OVERHEAD);

    let api_routes = Router::new()
        .route("/", get(api::handlers::dashboard::dashboard))
        // Groups
        .route("/groups", get(api::handlers::groups::list_groups))
        .route("/groups", post(api::handlers::groups::create_group))
        .route("/groups/{id}", get(api::handlers::groups::get_group))
        .route("/groups/{id}", put(api::handlers::groups::update_group))
        .route("/groups/{id}", delete(api::handlers::groups::delete_group))
        // Links
        .route("/links", get(api::handlers::links::list_links))
        .route("/links", post(api::handlers::links::create_link))
        .route("/links/{id}", get(api::handlers::links::get_link))
        .route("/links/{id}", put(api::handlers::links::update_link))
        .route("/links/{id}", delete(api::handlers::links::delete_link))
        // Configurations
        .route("/configurations", get(api::handlers::configurations::list_configurations))
        .route("/configurations", post(api::handlers::configurations::create_configuration))
        .route("/configurations/{id}", get(api::handlers::configurations::get_configuration))
        .route("/configurations/{id}", put(api::handlers::configurations::update_configuration))
        .route("/configurations/{id}", delete(api::handlers::configurations::delete_configuration))
        .route("/configuration/{id}", put(api::handlers::configurations::update_configuration))
        // Uploads and bundles
        .route(
            "/upload",
            post(api::handlers::uploads::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/export", get(api::handlers::bundle::export_bundle))
        .route(
            "/import",
            post(api::handlers::bundle::import_bundle).layer(DefaultBodyLimit::max(bundle_limit)),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(api_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.dir))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let router = router.layer(create_cors_layer(&state.config)?);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The HTTP server with its resources.
///
/// 1. **Setup**: [`Application::new`] connects to the database, runs migrations, prepares the
///    uploads directory and builds the router
/// 2. **Serve**: [`Application::serve`] listens until the shutdown future resolves
/// 3. **Shutdown**: in-flight requests finish, then the pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting HyperSpace with configuration: {:#?}", config);
        let pool = setup_database(&config).await?;
        Self::new_with_pool(config, pool).await
    }

    /// Create an application on an existing, already migrated pool
    pub async fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&config.uploads.dir).await?;
        let uploads = LocalUploadStore::new(&config.uploads.dir, config.uploads.naming);
        info!(dir = %uploads.base_path().display(), naming = ?config.uploads.naming, "Upload store ready");

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .uploads(Arc::new(uploads))
            .dashboard(Arc::new(DashboardRenderer::new()?))
            .build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "HyperSpace listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_application_integration(pool: PgPool) {
        let (server, _uploads) = create_test_app(pool).await;

        let health_response = server.get("/healthz").await;
        health_response.assert_status_ok();
        assert_eq!(health_response.text(), "OK");

        let openapi: serde_json::Value = server.get("/api-docs/openapi.json").await.json();
        assert_eq!(openapi["info"]["title"], "HyperSpace API");
        assert!(openapi["paths"]["/groups"].is_object());

        server.get("/docs").await.assert_status_ok();
        server.get("/uploads/missing.png").await.assert_status(StatusCode::NOT_FOUND);
    }

    /// Schema and rows as left behind by installations that predate the migration history
    const LEGACY_SCHEMA: &str = r#"
        CREATE TABLE groups (id SERIAL PRIMARY KEY, title VARCHAR(255) NOT NULL);
        CREATE TABLE links (
            id SERIAL PRIMARY KEY,
            group_id INTEGER REFERENCES groups(id),
            title VARCHAR(255) NOT NULL,
            link VARCHAR(255) NOT NULL,
            imageurl VARCHAR(255)
        );
        CREATE TABLE configurations (id SERIAL PRIMARY KEY, title VARCHAR(255) NOT NULL, datavalue VARCHAR(255));
        ALTER TABLE links ADD COLUMN notes TEXT;
        ALTER TABLE groups ADD COLUMN orderby INTEGER;
        ALTER TABLE links ADD COLUMN orderby INTEGER;
        INSERT INTO groups (title) VALUES ('Apps');
        INSERT INTO links (group_id, title, link) VALUES (1, 'Mail', 'https://mail.example');
    "#;

    #[sqlx::test(migrations = false)]
    #[test_log::test]
    async fn test_migrations_upgrade_legacy_schema(pool: PgPool) {
        sqlx::raw_sql(LEGACY_SCHEMA).execute(&pool).await.unwrap();
        crate::migrator().run(&pool).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let tree = crate::editor::database::load_tree(&mut conn).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].title, "Apps");
        assert_eq!(tree[0].orderby, 0);
        let links = tree[0].links.as_deref().unwrap_or_default();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].orderby, 0);

        // New rows without a rank still get the default
        sqlx::query("INSERT INTO groups (title) VALUES ('Tools')").execute(&pool).await.unwrap();
        let orderby: i32 = sqlx::query_scalar("SELECT orderby FROM groups WHERE title = 'Tools'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orderby, 0);

        // Deleting a legacy group orphans its links
        sqlx::query("DELETE FROM groups WHERE title = 'Apps'").execute(&pool).await.unwrap();
        let group_id: Option<i32> = sqlx::query_scalar("SELECT group_id FROM links").fetch_one(&pool).await.unwrap();
        assert_eq!(group_id, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cors_preflight(pool: PgPool) {
        let (server, _uploads) = create_test_app(pool).await;

        let response = server
            .method(axum::http::Method::OPTIONS, "/groups")
            .add_header("origin", "http://example.com")
            .add_header("access-control-request-method", "PUT")
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }

    #[test]
    fn test_cors_layer_accepts_listed_origins() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![
            crate::config::CorsOrigin::Wildcard,
            crate::config::CorsOrigin::Url("https://start.example.com/".parse().unwrap()),
        ];
        config.cors.max_age = None;
        assert!(super::create_cors_layer(&config).is_ok());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cors_preflight_with_listed_origins(pool: PgPool) {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![crate::config::CorsOrigin::Url("https://start.example.com/".parse().unwrap())];
        let (server, _uploads) = create_test_app_with_config(pool, config).await;

        let allowed = server
            .method(axum::http::Method::OPTIONS, "/groups")
            .add_header("origin", "https://start.example.com")
            .add_header("access-control-request-method", "PUT")
            .await;
        allowed.assert_status_ok();
        assert_eq!(allowed.header("access-control-allow-origin"), "https://start.example.com");

        let other = server
            .method(axum::http::Method::OPTIONS, "/groups")
            .add_header("origin", "http://elsewhere.example")
            .add_header("access-control-request-method", "PUT")
            .await;
        assert!(other.maybe_header("access-control-allow-origin").is_none());
    }
}
