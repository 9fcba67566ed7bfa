//! Database models for links.

use crate::api::models::links::{LinkCreate, LinkUpdate};
use crate::types::{GroupId, LinkId};

/// Database request for creating a new link
#[derive(Debug, Clone)]
pub struct LinkCreateDBRequest {
    pub group_id: GroupId,
    pub title: String,
    pub link: String,
    pub imageurl: Option<String>,
    pub notes: Option<String>,
    pub orderby: i32,
}

impl From<LinkCreate> for LinkCreateDBRequest {
    fn from(create: LinkCreate) -> Self {
        Self {
            group_id: create.group_id,
            title: create.title,
            link: create.link,
            imageurl: create.imageurl,
            notes: create.notes,
            orderby: create.orderby.unwrap_or(0),
        }
    }
}

/// Database request for updating a link. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct LinkUpdateDBRequest {
    pub group_id: Option<GroupId>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub imageurl: Option<String>,
    pub notes: Option<String>,
    pub orderby: Option<i32>,
}

impl From<LinkUpdate> for LinkUpdateDBRequest {
    fn from(update: LinkUpdate) -> Self {
        Self {
            group_id: update.group_id,
            title: Some(update.title),
            link: Some(update.link),
            imageurl: update.imageurl,
            notes: update.notes,
            orderby: update.orderby,
        }
    }
}

/// Database response for a link
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDBResponse {
    pub id: LinkId,
    pub group_id: Option<GroupId>,
    pub title: String,
    pub link: String,
    pub imageurl: Option<String>,
    pub notes: Option<String>,
    pub orderby: i32,
}
