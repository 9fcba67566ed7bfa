//! API request/response models for key/value configuration rows.

use crate::db::models::configurations::ConfigurationDBResponse;
use crate::types::ConfigurationId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfigurationCreate {
    /// Lookup key, e.g. `Background Image`
    #[schema(example = "Background Image")]
    pub title: String,
    #[serde(default)]
    #[schema(example = "bg.jpg")]
    pub datavalue: Option<String>,
}

impl ConfigurationCreate {
    pub fn validate(&self) -> Result<(), String> {
        super::require_non_empty("title", &self.title)
    }
}

/// Request body for updating a configuration row. Both fields are replaced.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfigurationUpdate {
    pub title: String,
    #[serde(default)]
    pub datavalue: Option<String>,
}

impl ConfigurationUpdate {
    pub fn validate(&self) -> Result<(), String> {
        super::require_non_empty("title", &self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConfigurationResponse {
    pub id: ConfigurationId,
    pub title: String,
    pub datavalue: Option<String>,
}

impl From<ConfigurationDBResponse> for ConfigurationResponse {
    fn from(db: ConfigurationDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            datavalue: db.datavalue,
        }
    }
}
