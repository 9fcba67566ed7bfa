//! HTTP request handlers for all API endpoints.
//!
//! Handlers are organized by resource type. Each one validates its input, runs its work through
//! the database repositories or the upload store, and serializes the response.
//!
//! # Handler Modules
//!
//! - [`groups`]: group CRUD; listing nests each group's links
//! - [`links`]: link CRUD
//! - [`configurations`]: key/value settings CRUD
//! - [`uploads`]: icon upload
//! - [`bundle`]: zip export and import of the whole dashboard
//! - [`dashboard`]: the rendered start page
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to the matching HTTP status code and
//! a JSON `{"error": ...}` body.

pub mod bundle;
pub mod configurations;
pub mod dashboard;
pub mod groups;
pub mod links;
pub mod uploads;

use crate::db::errors::DbError;
use crate::errors::Error;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;

/// Map a repository miss to a 404 naming the resource
pub(crate) fn or_not_found(resource: &'static str, id: i32) -> impl FnOnce(DbError) -> Error {
    move |err| match err {
        DbError::NotFound => Error::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    }
}

/// The `file` field of a multipart request
#[derive(Debug)]
pub(crate) struct FileField {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

fn multipart_error(err: MultipartError, limit: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge { limit }
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", err.body_text()),
        }
    }
}

/// Read the multipart field `file` into memory, failing fast once it exceeds `limit` bytes.
/// Other fields are ignored.
pub(crate) async fn read_file_field(mut multipart: Multipart, limit: usize) -> Result<FileField, Error> {
    while let Some(mut field) = multipart.next_field().await.map_err(|e| multipart_error(e, limit))? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime_guess::from_path(&file_name).first_or_octet_stream().to_string());

        let mut content = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
            if content.len() + chunk.len() > limit {
                tracing::warn!(file_name = %file_name, limit, "Upload exceeds size limit, aborting");
                return Err(Error::PayloadTooLarge { limit });
            }
            content.extend_from_slice(&chunk);
        }

        return Ok(FileField {
            file_name,
            content_type,
            content,
        });
    }

    Err(Error::BadRequest {
        message: "No file uploaded".to_string(),
    })
}
