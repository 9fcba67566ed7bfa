//! In-memory [`DashboardApi`] used by session and bundle tests.

use crate::api::models::{
    configurations::ConfigurationResponse,
    groups::{GroupCreate, GroupResponse, GroupUpdate},
    links::{LinkCreate, LinkResponse, LinkUpdate},
};
use crate::editor::api::{DashboardApi, Result, SyncError};
use crate::types::{ConfigurationId, GroupId, LinkId};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Default)]
pub struct MemoryApi {
    next_id: i32,
    calls: usize,
    pub groups: BTreeMap<GroupId, GroupResponse>,
    pub links: BTreeMap<LinkId, LinkResponse>,
    pub configurations: BTreeMap<ConfigurationId, ConfigurationResponse>,
    pub images: BTreeMap<String, Vec<u8>>,
    failing: HashSet<i32>,
    missing_images: HashSet<String>,
}

fn rejected(message: &str) -> SyncError {
    SyncError::Rejected {
        status: 400,
        message: message.to_string(),
    }
}

impl MemoryApi {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Number of API calls made so far
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Make every update of the group or link with this id fail
    pub fn fail_updates_for(&mut self, id: i32) {
        self.failing.insert(id);
    }

    /// Make fetching this image fail
    pub fn lose_image(&mut self, name: &str) {
        self.missing_images.insert(name.to_string());
    }

    pub fn seed_group(&mut self, title: &str, orderby: i32) -> GroupId {
        let id = self.next_id();
        self.groups.insert(
            id,
            GroupResponse {
                id,
                title: title.to_string(),
                orderby,
                links: None,
            },
        );
        id
    }

    pub fn seed_link(&mut self, group_id: GroupId, title: &str, orderby: i32) -> LinkId {
        let id = self.next_id();
        self.links.insert(
            id,
            LinkResponse {
                id,
                group_id: Some(group_id),
                title: title.to_string(),
                link: format!("https://{}.example", title.to_lowercase()),
                imageurl: None,
                notes: None,
                orderby,
            },
        );
        id
    }

    pub fn seed_configuration(&mut self, title: &str, datavalue: &str) -> ConfigurationId {
        let id = self.next_id();
        self.configurations.insert(
            id,
            ConfigurationResponse {
                id,
                title: title.to_string(),
                datavalue: Some(datavalue.to_string()),
            },
        );
        id
    }

    fn sorted_links(&self) -> Vec<LinkResponse> {
        let mut links: Vec<LinkResponse> = self.links.values().cloned().collect();
        links.sort_by_key(|l| (l.orderby, l.id));
        links
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

#[async_trait::async_trait]
impl DashboardApi for MemoryApi {
    async fn list_tree(&mut self) -> Result<Vec<GroupResponse>> {
        self.calls += 1;
        let links = self.sorted_links();
        let mut groups: Vec<GroupResponse> = self.groups.values().cloned().collect();
        groups.sort_by_key(|g| (g.orderby, g.id));
        Ok(groups
            .into_iter()
            .map(|g| {
                let nested = links.iter().filter(|l| l.group_id == Some(g.id)).cloned().collect();
                g.with_links(nested)
            })
            .collect())
    }

    async fn create_group(&mut self, request: &GroupCreate) -> Result<GroupResponse> {
        self.calls += 1;
        if request.title.trim().is_empty() {
            return Err(rejected("title is required"));
        }
        let id = self.next_id();
        let group = GroupResponse {
            id,
            title: request.title.clone(),
            orderby: request.orderby.unwrap_or(0),
            links: None,
        };
        self.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn update_group(&mut self, id: GroupId, request: &GroupUpdate) -> Result<GroupResponse> {
        self.calls += 1;
        if self.failing.contains(&id) {
            return Err(SyncError::Rejected {
                status: 500,
                message: "Internal server error".to_string(),
            });
        }
        let group = self.groups.get_mut(&id).ok_or_else(|| SyncError::not_found("Group", id))?;
        group.title = request.title.clone();
        if let Some(orderby) = request.orderby {
            group.orderby = orderby;
        }
        Ok(group.clone())
    }

    async fn delete_group(&mut self, id: GroupId) -> Result<()> {
        self.calls += 1;
        self.groups.remove(&id).ok_or_else(|| SyncError::not_found("Group", id))?;
        for link in self.links.values_mut().filter(|l| l.group_id == Some(id)) {
            link.group_id = None;
        }
        Ok(())
    }

    async fn list_links(&mut self) -> Result<Vec<LinkResponse>> {
        self.calls += 1;
        Ok(self.sorted_links())
    }

    async fn create_link(&mut self, request: &LinkCreate) -> Result<LinkResponse> {
        self.calls += 1;
        if !self.groups.contains_key(&request.group_id) {
            return Err(rejected("Referenced group does not exist"));
        }
        let id = self.next_id();
        let link = LinkResponse {
            id,
            group_id: Some(request.group_id),
            title: request.title.clone(),
            link: request.link.clone(),
            imageurl: non_empty(&request.imageurl),
            notes: non_empty(&request.notes),
            orderby: request.orderby.unwrap_or(0),
        };
        self.links.insert(id, link.clone());
        Ok(link)
    }

    async fn update_link(&mut self, id: LinkId, request: &LinkUpdate) -> Result<LinkResponse> {
        self.calls += 1;
        if self.failing.contains(&id) {
            return Err(SyncError::Rejected {
                status: 500,
                message: "Internal server error".to_string(),
            });
        }
        let link = self.links.get_mut(&id).ok_or_else(|| SyncError::not_found("Link", id))?;
        if let Some(group_id) = request.group_id {
            link.group_id = Some(group_id);
        }
        link.title = request.title.clone();
        link.link = request.link.clone();
        if request.imageurl.is_some() {
            link.imageurl = non_empty(&request.imageurl);
        }
        if request.notes.is_some() {
            link.notes = non_empty(&request.notes);
        }
        if let Some(orderby) = request.orderby {
            link.orderby = orderby;
        }
        Ok(link.clone())
    }

    async fn delete_link(&mut self, id: LinkId) -> Result<()> {
        self.calls += 1;
        self.links.remove(&id).map(|_| ()).ok_or_else(|| SyncError::not_found("Link", id))
    }

    async fn list_configurations(&mut self) -> Result<Vec<ConfigurationResponse>> {
        self.calls += 1;
        Ok(self.configurations.values().cloned().collect())
    }

    async fn delete_configuration(&mut self, id: ConfigurationId) -> Result<()> {
        self.calls += 1;
        self.configurations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| SyncError::not_found("Configuration", id))
    }

    async fn upload_image(&mut self, name: &str, content: Vec<u8>) -> Result<String> {
        self.calls += 1;
        let stored = format!("{}-{}", self.next_id(), name);
        self.images.insert(stored.clone(), content);
        Ok(stored)
    }

    async fn fetch_image(&mut self, name: &str) -> Result<Vec<u8>> {
        self.calls += 1;
        if self.missing_images.contains(name) {
            return Err(SyncError::not_found("Image", name));
        }
        self.images.get(name).cloned().ok_or_else(|| SyncError::not_found("Image", name))
    }
}
