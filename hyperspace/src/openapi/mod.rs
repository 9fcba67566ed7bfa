//! OpenAPI documentation for the HyperSpace HTTP API.
//!
//! Served as JSON at `/api-docs/openapi.json` and browsable at `/docs`.

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::api;

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
#[allow(unused)]
pub struct ErrorResponse {
    #[schema(example = "Group with ID 7 not found")]
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::groups::list_groups,
        api::handlers::groups::create_group,
        api::handlers::groups::get_group,
        api::handlers::groups::update_group,
        api::handlers::groups::delete_group,
        api::handlers::links::list_links,
        api::handlers::links::create_link,
        api::handlers::links::get_link,
        api::handlers::links::update_link,
        api::handlers::links::delete_link,
        api::handlers::configurations::list_configurations,
        api::handlers::configurations::create_configuration,
        api::handlers::configurations::get_configuration,
        api::handlers::configurations::update_configuration,
        api::handlers::configurations::delete_configuration,
        api::handlers::uploads::upload_file,
        api::handlers::bundle::export_bundle,
        api::handlers::bundle::import_bundle,
        api::handlers::dashboard::dashboard,
    ),
    components(
        schemas(
            ErrorResponse,
            api::models::DeletedResponse,
            api::models::groups::GroupCreate,
            api::models::groups::GroupUpdate,
            api::models::groups::GroupResponse,
            api::models::links::LinkCreate,
            api::models::links::LinkUpdate,
            api::models::links::LinkResponse,
            api::models::configurations::ConfigurationCreate,
            api::models::configurations::ConfigurationUpdate,
            api::models::configurations::ConfigurationResponse,
            api::models::uploads::UploadedFile,
            api::models::uploads::UploadResponse,
            api::models::bundle::ImportResponse,
        )
    ),
    tags(
        (name = "groups", description = "Dashboard columns. Groups are shown in ascending `orderby`, ties broken by id."),
        (name = "links", description = "Bookmarks. `orderby` ranks a link within its group. Links of a deleted group are kept with a null `group_id`."),
        (name = "configurations", description = "Key/value settings. The row titled `Background Image` selects the dashboard background."),
        (name = "uploads", description = "Link icons. Stored files are served at `/uploads/{filename}`."),
        (name = "bundle", description = "Zip export and import of the whole dashboard, including icons."),
        (name = "dashboard", description = "The rendered start page."),
    ),
    info(
        title = "HyperSpace API",
        version = "1.0.0",
        description = "CRUD API behind the HyperSpace start page.

## Errors

Failed requests return a JSON body with a single `error` field:

```json
{ \"error\": \"title is required\" }
```",
    ),
)]
pub struct ApiDoc;
