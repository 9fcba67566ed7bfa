//! [`DashboardApi`] over a database connection and the local upload store.
//!
//! This is what the server's `/export` and `/import` endpoints run the bundle routine against.
//! Handing it a transaction makes an import all-or-nothing for the database rows.

use crate::api::models::{
    configurations::ConfigurationResponse,
    groups::{GroupCreate, GroupResponse, GroupUpdate},
    links::{LinkCreate, LinkResponse, LinkUpdate},
};
use crate::db::handlers::{
    Configurations, Groups, Links, Repository, configurations::ConfigurationFilter, groups::GroupFilter, links::LinkFilter,
};
use crate::db::models::{
    groups::{GroupCreateDBRequest, GroupUpdateDBRequest},
    links::{LinkCreateDBRequest, LinkUpdateDBRequest},
};
use crate::editor::api::{DashboardApi, Result, SyncError};
use crate::storage::UploadStore;
use crate::types::{ConfigurationId, GroupId, LinkId};
use sqlx::PgConnection;

pub struct DatabaseApi<'c> {
    db: &'c mut PgConnection,
    uploads: &'c dyn UploadStore,
}

impl<'c> DatabaseApi<'c> {
    pub fn new(db: &'c mut PgConnection, uploads: &'c dyn UploadStore) -> Self {
        Self { db, uploads }
    }
}

fn invalid(message: String) -> SyncError {
    SyncError::Rejected { status: 400, message }
}

/// Groups in display order with their links nested in display order
pub async fn load_tree(db: &mut PgConnection) -> crate::db::errors::Result<Vec<GroupResponse>> {
    let groups = Groups::new(&mut *db).list(&GroupFilter::new()).await?;
    let group_ids = groups.iter().map(|g| g.id).collect();
    let links = Links::new(&mut *db).list(&LinkFilter::new().with_groups(group_ids)).await?;

    let mut links: Vec<LinkResponse> = links.into_iter().map(LinkResponse::from).collect();
    Ok(groups
        .into_iter()
        .map(|group| {
            let (nested, rest): (Vec<_>, Vec<_>) = links.drain(..).partition(|l| l.group_id == Some(group.id));
            links = rest;
            GroupResponse::from(group).with_links(nested)
        })
        .collect())
}

#[async_trait::async_trait]
impl<'c> DashboardApi for DatabaseApi<'c> {
    async fn list_tree(&mut self) -> Result<Vec<GroupResponse>> {
        Ok(load_tree(&mut *self.db).await?)
    }

    async fn create_group(&mut self, request: &GroupCreate) -> Result<GroupResponse> {
        request.validate().map_err(invalid)?;
        let group = Groups::new(&mut *self.db).create(&GroupCreateDBRequest::from(request.clone())).await?;
        Ok(GroupResponse::from(group))
    }

    async fn update_group(&mut self, id: GroupId, request: &GroupUpdate) -> Result<GroupResponse> {
        request.validate().map_err(invalid)?;
        let group = Groups::new(&mut *self.db).update(id, &GroupUpdateDBRequest::from(request.clone())).await?;
        Ok(GroupResponse::from(group))
    }

    async fn delete_group(&mut self, id: GroupId) -> Result<()> {
        if !Groups::new(&mut *self.db).delete(id).await? {
            return Err(SyncError::not_found("Group", id));
        }
        Ok(())
    }

    async fn list_links(&mut self) -> Result<Vec<LinkResponse>> {
        let links = Links::new(&mut *self.db).list(&LinkFilter::new()).await?;
        Ok(links.into_iter().map(LinkResponse::from).collect())
    }

    async fn create_link(&mut self, request: &LinkCreate) -> Result<LinkResponse> {
        request.validate().map_err(invalid)?;
        let link = Links::new(&mut *self.db).create(&LinkCreateDBRequest::from(request.clone())).await?;
        Ok(LinkResponse::from(link))
    }

    async fn update_link(&mut self, id: LinkId, request: &LinkUpdate) -> Result<LinkResponse> {
        request.validate().map_err(invalid)?;
        let link = Links::new(&mut *self.db).update(id, &LinkUpdateDBRequest::from(request.clone())).await?;
        Ok(LinkResponse::from(link))
    }

    async fn delete_link(&mut self, id: LinkId) -> Result<()> {
        if !Links::new(&mut *self.db).delete(id).await? {
            return Err(SyncError::not_found("Link", id));
        }
        Ok(())
    }

    async fn list_configurations(&mut self) -> Result<Vec<ConfigurationResponse>> {
        let rows = Configurations::new(&mut *self.db).list(&ConfigurationFilter::new()).await?;
        Ok(rows.into_iter().map(ConfigurationResponse::from).collect())
    }

    async fn delete_configuration(&mut self, id: ConfigurationId) -> Result<()> {
        if !Configurations::new(&mut *self.db).delete(id).await? {
            return Err(SyncError::not_found("Configuration", id));
        }
        Ok(())
    }

    async fn upload_image(&mut self, name: &str, content: Vec<u8>) -> Result<String> {
        Ok(self.uploads.store(name, &content).await?)
    }

    async fn fetch_image(&mut self, name: &str) -> Result<Vec<u8>> {
        Ok(self.uploads.retrieve(name).await?)
    }

    /// Bulk deletes in dependency order
    async fn wipe(&mut self) -> Result<()> {
        let links = Links::new(&mut *self.db).delete_all().await?;
        let groups = Groups::new(&mut *self.db).delete_all().await?;
        let configurations = Configurations::new(&mut *self.db).delete_all().await?;
        tracing::info!(links, groups, configurations, "Wiped dashboard data");
        Ok(())
    }
}
