//! API request/response models for links (dashboard bookmarks).

use crate::db::models::links::LinkDBResponse;
use crate::types::{GroupId, LinkId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a link.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkCreate {
    /// Owning group
    pub group_id: GroupId,
    #[schema(example = "Mail")]
    pub title: String,
    /// Target URL
    #[schema(example = "https://mail.example.com")]
    pub link: String,
    /// Stored filename of the icon returned by `POST /upload`
    #[serde(default)]
    #[schema(example = "1718000000000-mail.png")]
    pub imageurl: Option<String>,
    /// Rich-text (HTML) note
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub orderby: Option<i32>,
}

impl LinkCreate {
    pub fn validate(&self) -> Result<(), String> {
        super::require_non_empty("title", &self.title)?;
        super::require_non_empty("link", &self.link)
    }
}

/// Request body for `PUT /links/{id}`.
///
/// `title` and `link` are replaced. Optional fields that are absent keep their stored value;
/// send an empty string to clear `imageurl` or `notes`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkUpdate {
    #[serde(default)]
    pub group_id: Option<GroupId>,
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub imageurl: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub orderby: Option<i32>,
}

impl LinkUpdate {
    pub fn validate(&self) -> Result<(), String> {
        super::require_non_empty("title", &self.title)?;
        super::require_non_empty("link", &self.link)
    }
}

/// A link as returned by the API. `group_id` is null for links whose group was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LinkResponse {
    pub id: LinkId,
    pub group_id: Option<GroupId>,
    pub title: String,
    pub link: String,
    pub imageurl: Option<String>,
    pub notes: Option<String>,
    pub orderby: i32,
}

impl From<LinkDBResponse> for LinkResponse {
    fn from(db: LinkDBResponse) -> Self {
        Self {
            id: db.id,
            group_id: db.group_id,
            title: db.title,
            link: db.link,
            imageurl: db.imageurl,
            notes: db.notes,
            orderby: db.orderby,
        }
    }
}
