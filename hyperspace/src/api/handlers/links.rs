use crate::api::handlers::or_not_found;
use crate::api::models::DeletedResponse;
use crate::api::models::links::{LinkCreate, LinkResponse, LinkUpdate};
use crate::db::handlers::{Links, Repository, links::LinkFilter};
use crate::db::models::links::{LinkCreateDBRequest, LinkUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::{AppState, types::LinkId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/links",
    tag = "links",
    summary = "List links",
    description = "Every link ordered by rank, including orphans whose group was deleted.",
    responses(
        (status = 200, description = "All links", body = Vec<LinkResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_links(State(state): State<AppState>) -> Result<Json<Vec<LinkResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Links::new(&mut pool_conn);

    let links = repo.list(&LinkFilter::new()).await?;
    Ok(Json(links.into_iter().map(LinkResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/links",
    tag = "links",
    summary = "Create link",
    request_body = LinkCreate,
    responses(
        (status = 201, description = "Link created", body = LinkResponse),
        (status = 400, description = "Missing title or URL, or unknown group"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_link(State(state): State<AppState>, Json(create): Json<LinkCreate>) -> Result<(StatusCode, Json<LinkResponse>)> {
    create.validate().map_err(|message| Error::BadRequest { message })?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Links::new(&mut pool_conn);

    let link = repo.create(&LinkCreateDBRequest::from(create)).await?;
    Ok((StatusCode::CREATED, Json(LinkResponse::from(link))))
}

#[utoipa::path(
    get,
    path = "/links/{link_id}",
    tag = "links",
    summary = "Get link",
    params(("link_id" = i32, Path, description = "Link ID")),
    responses(
        (status = 200, description = "Link details", body = LinkResponse),
        (status = 404, description = "Link not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_link(State(state): State<AppState>, Path(link_id): Path<LinkId>) -> Result<Json<LinkResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Links::new(&mut pool_conn);

    match repo.get_by_id(link_id).await? {
        Some(link) => Ok(Json(LinkResponse::from(link))),
        None => Err(Error::NotFound {
            resource: "Link".to_string(),
            id: link_id.to_string(),
        }),
    }
}

#[utoipa::path(
    put,
    path = "/links/{link_id}",
    tag = "links",
    summary = "Update link",
    description = "Replaces title and URL. Absent optional fields keep their stored value; an empty `imageurl` or `notes` clears it.",
    params(("link_id" = i32, Path, description = "Link ID")),
    request_body = LinkUpdate,
    responses(
        (status = 200, description = "Link updated", body = LinkResponse),
        (status = 400, description = "Missing title or URL, or unknown group"),
        (status = 404, description = "Link not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_link(
    State(state): State<AppState>,
    Path(link_id): Path<LinkId>,
    Json(update): Json<LinkUpdate>,
) -> Result<Json<LinkResponse>> {
    update.validate().map_err(|message| Error::BadRequest { message })?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Links::new(&mut pool_conn);

    let link = repo
        .update(link_id, &LinkUpdateDBRequest::from(update))
        .await
        .map_err(or_not_found("Link", link_id))?;
    Ok(Json(LinkResponse::from(link)))
}

#[utoipa::path(
    delete,
    path = "/links/{link_id}",
    tag = "links",
    summary = "Delete link",
    params(("link_id" = i32, Path, description = "Link ID")),
    responses(
        (status = 200, description = "Link deleted", body = DeletedResponse),
        (status = 404, description = "Link not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_link(State(state): State<AppState>, Path(link_id): Path<LinkId>) -> Result<Json<DeletedResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Links::new(&mut pool_conn);

    if repo.delete(link_id).await? {
        Ok(Json(DeletedResponse {
            message: "Link deleted successfully".to_string(),
        }))
    } else {
        Err(Error::NotFound {
            resource: "Link".to_string(),
            id: link_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::{groups::GroupResponse, links::LinkResponse};
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_apps_mail_scenario(pool: PgPool) {
        let (app, _uploads) = create_test_app(pool).await;

        let apps: GroupResponse = app.post("/groups").json(&json!({"title": "Apps"})).await.json();
        let response = app
            .post("/links")
            .json(&json!({
                "group_id": apps.id,
                "title": "Mail",
                "link": "https://mail.example.com",
                "notes": "<p>Inbox</p>"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let mail: LinkResponse = response.json();
        assert_eq!(mail.group_id, Some(apps.id));
        assert_eq!(mail.imageurl, None);

        let groups: Vec<GroupResponse> = app.get("/groups").await.json();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, "Apps");
        assert_eq!(groups[0].links, Some(vec![mail.clone()]));

        let fetched: LinkResponse = app.get(&format!("/links/{}", mail.id)).await.json();
        assert_eq!(fetched.notes.as_deref(), Some("<p>Inbox</p>"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_link_validation(pool: PgPool) {
        let (app, _uploads) = create_test_app(pool.clone()).await;
        let group = create_test_group(&pool, "Apps", 0).await;

        let response = app
            .post("/links")
            .json(&json!({"group_id": group.id, "title": "Mail", "link": ""}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<serde_json::Value>()["error"], "link is required");

        let response = app
            .post("/links")
            .json(&json!({"group_id": 999999, "title": "Mail", "link": "https://mail.example.com"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<serde_json::Value>()["error"], "Referenced group does not exist");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_link_keeps_and_clears_optional_fields(pool: PgPool) {
        let (app, _uploads) = create_test_app(pool.clone()).await;
        let apps = create_test_group(&pool, "Apps", 0).await;
        let media = create_test_group(&pool, "Media", 1).await;
        let created: LinkResponse = app
            .post("/links")
            .json(&json!({
                "group_id": apps.id,
                "title": "Mail",
                "link": "https://mail.example.com",
                "imageurl": "mail.png",
                "notes": "<p>Inbox</p>",
                "orderby": 3
            }))
            .await
            .json();

        let response = app
            .put(&format!("/links/{}", created.id))
            .json(&json!({"title": "Webmail", "link": "https://webmail.example.com", "notes": ""}))
            .await;
        response.assert_status_ok();
        let updated: LinkResponse = response.json();
        assert_eq!(updated.title, "Webmail");
        assert_eq!(updated.imageurl.as_deref(), Some("mail.png"));
        assert_eq!(updated.notes, None);
        assert_eq!(updated.orderby, 3);
        assert_eq!(updated.group_id, Some(apps.id));

        let moved: LinkResponse = app
            .put(&format!("/links/{}", created.id))
            .json(&json!({"group_id": media.id, "title": "Webmail", "link": "https://webmail.example.com"}))
            .await
            .json();
        assert_eq!(moved.group_id, Some(media.id));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_missing_links_are_not_found(pool: PgPool) {
        let (app, _uploads) = create_test_app(pool).await;

        app.get("/links/424242").await.assert_status(StatusCode::NOT_FOUND);
        app.delete("/links/424242").await.assert_status(StatusCode::NOT_FOUND);
        let response = app
            .put("/links/424242")
            .json(&json!({"title": "Mail", "link": "https://mail.example.com"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<serde_json::Value>()["error"], "Link with ID 424242 not found");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_link(pool: PgPool) {
        let (app, _uploads) = create_test_app(pool.clone()).await;
        let group = create_test_group(&pool, "Apps", 0).await;
        let link = create_test_link(&pool, group.id, "Mail", 0).await;

        app.delete(&format!("/links/{}", link.id)).await.assert_status_ok();
        assert!(app.get("/links").await.json::<Vec<LinkResponse>>().is_empty());
    }
}
