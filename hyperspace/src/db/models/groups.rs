//! Database models for groups.

use crate::api::models::groups::{GroupCreate, GroupUpdate};
use crate::types::GroupId;

/// Database request for creating a new group
#[derive(Debug, Clone)]
pub struct GroupCreateDBRequest {
    pub title: String,
    pub orderby: i32,
}

impl From<GroupCreate> for GroupCreateDBRequest {
    fn from(create: GroupCreate) -> Self {
        Self {
            title: create.title,
            orderby: create.orderby.unwrap_or(0),
        }
    }
}

/// Database request for updating a group. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct GroupUpdateDBRequest {
    pub title: Option<String>,
    pub orderby: Option<i32>,
}

impl From<GroupUpdate> for GroupUpdateDBRequest {
    fn from(update: GroupUpdate) -> Self {
        Self {
            title: Some(update.title),
            orderby: update.orderby,
        }
    }
}

/// Database response for a group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDBResponse {
    pub id: GroupId,
    pub title: String,
    pub orderby: i32,
}
