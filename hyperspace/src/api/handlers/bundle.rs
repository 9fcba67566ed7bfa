use crate::AppState;
use crate::api::handlers::read_file_field;
use crate::api::models::bundle::ImportResponse;
use crate::bundle::{self, BundleError};
use crate::editor::database::{DatabaseApi, load_tree};
use crate::editor::{DashboardApi, Tree};
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};

#[utoipa::path(
    get,
    path = "/export",
    tag = "bundle",
    summary = "Export dashboard",
    description = "Zip archive with `data.json` (groups with nested links) and every referenced image under `images/`.",
    responses(
        (status = 200, description = "Zip bundle", content_type = "application/zip", body = Vec<u8>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn export_bundle(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut api = DatabaseApi::new(&mut pool_conn, state.uploads.as_ref());

    let tree = Tree::from(api.list_tree().await.map_err(BundleError::from)?);
    let archive = bundle::export(&mut api, &tree).await?;

    let file_name = bundle::export_file_name(chrono::Utc::now());
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        archive,
    ))
}

#[utoipa::path(
    post,
    path = "/import",
    tag = "bundle",
    summary = "Import dashboard",
    description = "Replaces all groups, links and configuration rows with the contents of an exported bundle sent in field `file`. Runs in one transaction; on failure the previous data is kept.",
    request_body(content_type = "multipart/form-data", description = "Zip bundle in field `file`"),
    responses(
        (status = 200, description = "Import completed", body = ImportResponse),
        (status = 400, description = "Not a bundle, or data.json missing or malformed"),
        (status = 413, description = "Bundle exceeds the configured size limit"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn import_bundle(State(state): State<AppState>, multipart: Multipart) -> Result<Json<ImportResponse>> {
    let upload = read_file_field(multipart, state.config.uploads.max_bundle_size).await?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    {
        let mut api = DatabaseApi::new(&mut tx, state.uploads.as_ref());
        let tree = bundle::import(&mut api, &upload.content).await?;
        tracing::info!(groups = tree.groups().len(), file = %upload.file_name, "Bundle imported");
    }
    let groups = load_tree(&mut tx).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(ImportResponse {
        message: "Import completed".to_string(),
        groups,
    }))
}
