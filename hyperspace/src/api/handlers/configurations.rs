use crate::api::handlers::or_not_found;
use crate::api::models::DeletedResponse;
use crate::api::models::configurations::{ConfigurationCreate, ConfigurationResponse, ConfigurationUpdate};
use crate::db::handlers::{Configurations, Repository, configurations::ConfigurationFilter};
use crate::db::models::configurations::{ConfigurationCreateDBRequest, ConfigurationUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::{AppState, types::ConfigurationId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/configurations",
    tag = "configurations",
    summary = "List configuration rows",
    responses(
        (status = 200, description = "All configuration rows", body = Vec<ConfigurationResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_configurations(State(state): State<AppState>) -> Result<Json<Vec<ConfigurationResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Configurations::new(&mut pool_conn);

    let rows = repo.list(&ConfigurationFilter::new()).await?;
    Ok(Json(rows.into_iter().map(ConfigurationResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/configurations",
    tag = "configurations",
    summary = "Create configuration row",
    request_body = ConfigurationCreate,
    responses(
        (status = 201, description = "Configuration row created", body = ConfigurationResponse),
        (status = 400, description = "Missing title"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_configuration(
    State(state): State<AppState>,
    Json(create): Json<ConfigurationCreate>,
) -> Result<(StatusCode, Json<ConfigurationResponse>)> {
    create.validate().map_err(|message| Error::BadRequest { message })?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Configurations::new(&mut pool_conn);

    let row = repo.create(&ConfigurationCreateDBRequest::from(create)).await?;
    Ok((StatusCode::CREATED, Json(ConfigurationResponse::from(row))))
}

#[utoipa::path(
    get,
    path = "/configurations/{configuration_id}",
    tag = "configurations",
    summary = "Get configuration row",
    params(("configuration_id" = i32, Path, description = "Configuration ID")),
    responses(
        (status = 200, description = "Configuration row", body = ConfigurationResponse),
        (status = 404, description = "Configuration row not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_configuration(
    State(state): State<AppState>,
    Path(configuration_id): Path<ConfigurationId>,
) -> Result<Json<ConfigurationResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Configurations::new(&mut pool_conn);

    match repo.get_by_id(configuration_id).await? {
        Some(row) => Ok(Json(ConfigurationResponse::from(row))),
        None => Err(Error::NotFound {
            resource: "Configuration".to_string(),
            id: configuration_id.to_string(),
        }),
    }
}

/// Mounted on both `/configuration/{id}` and `/configurations/{id}`
#[utoipa::path(
    put,
    path = "/configuration/{configuration_id}",
    tag = "configurations",
    summary = "Update configuration row",
    description = "Replaces title and value. Also available as `PUT /configurations/{configuration_id}`.",
    params(("configuration_id" = i32, Path, description = "Configuration ID")),
    request_body = ConfigurationUpdate,
    responses(
        (status = 200, description = "Configuration row updated", body = ConfigurationResponse),
        (status = 400, description = "Missing title"),
        (status = 404, description = "Configuration row not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_configuration(
    State(state): State<AppState>,
    Path(configuration_id): Path<ConfigurationId>,
    Json(update): Json<ConfigurationUpdate>,
) -> Result<Json<ConfigurationResponse>> {
    update.validate().map_err(|message| Error::BadRequest { message })?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Configurations::new(&mut pool_conn);

    let row = repo
        .update(configuration_id, &ConfigurationUpdateDBRequest::from(update))
        .await
        .map_err(or_not_found("Configuration", configuration_id))?;
    Ok(Json(ConfigurationResponse::from(row)))
}

#[utoipa::path(
    delete,
    path = "/configurations/{configuration_id}",
    tag = "configurations",
    summary = "Delete configuration row",
    params(("configuration_id" = i32, Path, description = "Configuration ID")),
    responses(
        (status = 200, description = "Configuration row deleted", body = DeletedResponse),
        (status = 404, description = "Configuration row not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_configuration(
    State(state): State<AppState>,
    Path(configuration_id): Path<ConfigurationId>,
) -> Result<Json<DeletedResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Configurations::new(&mut pool_conn);

    if repo.delete(configuration_id).await? {
        Ok(Json(DeletedResponse {
            message: "Configuration deleted successfully".to_string(),
        }))
    } else {
        Err(Error::NotFound {
            resource: "Configuration".to_string(),
            id: configuration_id.to_string(),
        })
    }
}
