//! Test utilities for integration testing.

use crate::config::{Config, PoolSettings};
use crate::db::handlers::{Groups, Links, Repository};
use crate::db::models::{
    groups::{GroupCreateDBRequest, GroupDBResponse},
    links::{LinkCreateDBRequest, LinkDBResponse},
};
use crate::types::GroupId;
use axum_test::TestServer;
use sqlx::PgPool;
use tempfile::TempDir;

/// Build the full application on a test pool with a fresh uploads directory.
///
/// Keep the returned directory alive for as long as the server is used.
pub async fn create_test_app(pool: PgPool) -> (TestServer, TempDir) {
    create_test_app_with_config(pool, create_test_config()).await
}

pub async fn create_test_app_with_config(pool: PgPool, mut config: Config) -> (TestServer, TempDir) {
    let uploads = tempfile::tempdir().expect("Failed to create uploads directory");
    config.uploads.dir = uploads.path().to_path_buf();

    let app = crate::Application::new_with_pool(config, pool)
        .await
        .expect("Failed to create application");

    (app.into_test_server(), uploads)
}

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    };
    config.database.pool = PoolSettings {
        max_connections: 2,
        min_connections: 0,
        ..Default::default()
    };
    config
}

pub async fn create_test_group(pool: &PgPool, title: &str, orderby: i32) -> GroupDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Groups::new(&mut conn);
    repo.create(&GroupCreateDBRequest {
        title: title.to_string(),
        orderby,
    })
    .await
    .expect("Failed to create test group")
}

/// Create a link pointing at `https://<title>.example`
pub async fn create_test_link(pool: &PgPool, group_id: GroupId, title: &str, orderby: i32) -> LinkDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Links::new(&mut conn);
    repo.create(&LinkCreateDBRequest {
        group_id,
        title: title.to_string(),
        link: format!("https://{}.example", title.to_lowercase().replace(' ', "-")),
        imageurl: None,
        notes: None,
        orderby,
    })
    .await
    .expect("Failed to create test link")
}
