use crate::api::handlers::or_not_found;
use crate::api::models::DeletedResponse;
use crate::api::models::groups::{GroupCreate, GroupResponse, GroupUpdate};
use crate::db::handlers::{Groups, Repository};
use crate::db::models::groups::{GroupCreateDBRequest, GroupUpdateDBRequest};
use crate::editor::database::load_tree;
use crate::errors::{Error, Result};
use crate::{AppState, types::GroupId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/groups",
    tag = "groups",
    summary = "List groups",
    description = "All groups ordered by rank, each with its links nested in rank order. Orphaned links are not included.",
    responses(
        (status = 200, description = "Groups with their links", body = Vec<GroupResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<GroupResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let groups = load_tree(&mut pool_conn).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    post,
    path = "/groups",
    tag = "groups",
    summary = "Create group",
    request_body = GroupCreate,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Missing title"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_group(State(state): State<AppState>, Json(create): Json<GroupCreate>) -> Result<(StatusCode, Json<GroupResponse>)> {
    create.validate().map_err(|message| Error::BadRequest { message })?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Groups::new(&mut pool_conn);

    let group = repo.create(&GroupCreateDBRequest::from(create)).await?;
    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}",
    tag = "groups",
    summary = "Get group",
    params(("group_id" = i32, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group details", body = GroupResponse),
        (status = 404, description = "Group not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_group(State(state): State<AppState>, Path(group_id): Path<GroupId>) -> Result<Json<GroupResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Groups::new(&mut pool_conn);

    match repo.get_by_id(group_id).await? {
        Some(group) => Ok(Json(GroupResponse::from(group))),
        None => Err(Error::NotFound {
            resource: "Group".to_string(),
            id: group_id.to_string(),
        }),
    }
}

#[utoipa::path(
    put,
    path = "/groups/{group_id}",
    tag = "groups",
    summary = "Update group",
    description = "Replaces the title. The rank is only changed when `orderby` is sent.",
    params(("group_id" = i32, Path, description = "Group ID")),
    request_body = GroupUpdate,
    responses(
        (status = 200, description = "Group updated", body = GroupResponse),
        (status = 400, description = "Missing title"),
        (status = 404, description = "Group not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_group(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(update): Json<GroupUpdate>,
) -> Result<Json<GroupResponse>> {
    update.validate().map_err(|message| Error::BadRequest { message })?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Groups::new(&mut pool_conn);

    let group = repo
        .update(group_id, &GroupUpdateDBRequest::from(update))
        .await
        .map_err(or_not_found("Group", group_id))?;
    Ok(Json(GroupResponse::from(group)))
}

#[utoipa::path(
    delete,
    path = "/groups/{group_id}",
    tag = "groups",
    summary = "Delete group",
    description = "Deletes the group. Its links are kept as orphans with a null `group_id`.",
    params(("group_id" = i32, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group deleted", body = DeletedResponse),
        (status = 404, description = "Group not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_group(State(state): State<AppState>, Path(group_id): Path<GroupId>) -> Result<Json<DeletedResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Groups::new(&mut pool_conn);

    if repo.delete(group_id).await? {
        Ok(Json(DeletedResponse {
            message: "Group deleted successfully".to_string(),
        }))
    } else {
        Err(Error::NotFound {
            resource: "Group".to_string(),
            id: group_id.to_string(),
        })
    }
}
