//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Groups** (`/groups`, `/groups/{id}`): dashboard columns
//! - **Links** (`/links`, `/links/{id}`): bookmarks inside a group
//! - **Configurations** (`/configurations`, `/configuration/{id}`): key/value settings
//! - **Uploads** (`/upload`, `/uploads/{name}`): icon and background images
//! - **Bundle** (`/export`, `/import`): zip archives of the whole dashboard
//! - **Dashboard** (`/`): the rendered start page
//!
//! # OpenAPI Documentation
//!
//! Endpoints are annotated with `utoipa`. The interactive reference is served at `/docs`
//! and the raw document at `/api-docs/openapi.json`.

pub mod handlers;
pub mod models;
