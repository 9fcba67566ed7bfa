//! API response models for bundle import.

use super::groups::GroupResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    #[schema(example = "Import completed")]
    pub message: String,
    /// The dashboard as stored after the import
    pub groups: Vec<GroupResponse>,
}
