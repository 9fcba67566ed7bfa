//! API request/response models for dashboard groups.

use super::links::LinkResponse;
use crate::db::models::groups::GroupDBResponse;
use crate::types::GroupId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a new group.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupCreate {
    /// Column heading shown on the dashboard
    #[schema(example = "Apps")]
    pub title: String,
    /// Rank among all groups (defaults to 0)
    #[serde(default)]
    #[schema(example = 0)]
    pub orderby: Option<i32>,
}

impl GroupCreate {
    pub fn validate(&self) -> Result<(), String> {
        super::require_non_empty("title", &self.title)
    }
}

/// Request body for `PUT /groups/{id}`. The title is replaced; an absent `orderby` keeps the
/// stored rank.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupUpdate {
    #[schema(example = "Apps")]
    pub title: String,
    #[serde(default)]
    pub orderby: Option<i32>,
}

impl GroupUpdate {
    pub fn validate(&self) -> Result<(), String> {
        super::require_non_empty("title", &self.title)
    }
}

/// A group as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GroupResponse {
    pub id: GroupId,
    pub title: String,
    pub orderby: i32,
    /// Links of this group ordered by rank (only present on `GET /groups`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkResponse>>,
}

impl From<GroupDBResponse> for GroupResponse {
    fn from(db: GroupDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            orderby: db.orderby,
            links: None,
        }
    }
}

impl GroupResponse {
    pub fn with_links(mut self, links: Vec<LinkResponse>) -> Self {
        self.links = Some(links);
        self
    }
}
