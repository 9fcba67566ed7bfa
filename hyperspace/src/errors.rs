use crate::bundle::BundleError;
use crate::db::errors::DbError;
use crate::editor::SyncError;
use crate::storage::StorageError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Request body over the configured limit
    #[error("Payload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Upload storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Import/export bundle error
    #[error(transparent)]
    Bundle(#[from] BundleError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => db_status(db_err),
            Error::Storage(storage_err) => storage_status(storage_err),
            Error::Bundle(bundle_err) => match bundle_err {
                BundleError::MissingData | BundleError::Malformed(_) | BundleError::Archive(_) => StatusCode::BAD_REQUEST,
                BundleError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                BundleError::Sync(sync_err) => match sync_err {
                    SyncError::NotFound { .. } => StatusCode::NOT_FOUND,
                    SyncError::Persistence(db_err) => db_status(db_err),
                    SyncError::Storage(storage_err) => storage_status(storage_err),
                    SyncError::Rejected { status, .. } => StatusCode::from_u16(*status)
                        .ok()
                        .filter(|s| s.is_client_error())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    SyncError::Transport(_) | SyncError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
                },
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::PayloadTooLarge { limit } => format!("Payload exceeds the {limit} byte limit"),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Database(db_err) => db_message(db_err),
            Error::Storage(storage_err) => storage_message(storage_err),
            Error::Bundle(bundle_err) => match bundle_err {
                BundleError::MissingData => "Archive does not contain data.json".to_string(),
                BundleError::Malformed(_) => "data.json is not a valid group list".to_string(),
                BundleError::Archive(_) => "File is not a valid zip archive".to_string(),
                BundleError::Io(_) => "Internal server error".to_string(),
                BundleError::Sync(sync_err) => match sync_err {
                    SyncError::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
                    SyncError::Persistence(db_err) => db_message(db_err),
                    SyncError::Storage(storage_err) => storage_message(storage_err),
                    SyncError::Rejected { status, message } if (400..500).contains(status) => message.clone(),
                    _ => "Internal server error".to_string(),
                },
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

fn db_status(err: &DbError) -> StatusCode {
    match err {
        DbError::NotFound => StatusCode::NOT_FOUND,
        DbError::ForeignKeyViolation { .. } | DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
        DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn db_message(err: &DbError) -> String {
    match err {
        DbError::NotFound => "Resource not found".to_string(),
        DbError::ForeignKeyViolation { table, .. } => match table.as_deref() {
            Some("links") => "Referenced group does not exist".to_string(),
            _ => "Invalid reference to related resource".to_string(),
        },
        DbError::CheckViolation { .. } => "Invalid data provided".to_string(),
        DbError::Other(_) => "Database error occurred".to_string(),
    }
}

fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::InvalidName(_) => StatusCode::BAD_REQUEST,
        StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn storage_message(err: &StorageError) -> String {
    match err {
        StorageError::NotFound(name) => format!("File {name} not found"),
        StorageError::InvalidName(_) => "Invalid file name".to_string(),
        StorageError::Io(_) => "Internal server error".to_string(),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details, level by severity
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Internal service error: {:#}", self);
        } else if matches!(self, Error::Database(_)) {
            tracing::warn!("Database constraint error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

/// Convert from String errors (e.g., from external functions)
impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Internal { operation: msg }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
