//! API request and response data models.
//!
//! These structures define the public JSON contract. They are kept separate from the
//! database records in [`crate::db::models`] so the storage schema can evolve on its own.
//! All models are annotated with `utoipa` for the generated API docs.
//!
//! - [`groups`]: dashboard columns
//! - [`links`]: bookmarks inside a group
//! - [`configurations`]: key/value settings such as the background image
//! - [`uploads`]: icon upload results
//! - [`bundle`]: export/import results

pub mod bundle;
pub mod configurations;
pub mod groups;
pub mod links;
pub mod uploads;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Confirmation returned by delete endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    #[schema(example = "Group deleted successfully")]
    pub message: String,
}

/// Reject blank required fields, returning the message for a 400 response
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}
