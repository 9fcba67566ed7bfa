//! The seam between an editor session and the store it mirrors.
//!
//! [`DashboardApi`] is the set of calls the editor and the bundle routine make. It is implemented
//! over HTTP by [`crate::client::HttpDashboardClient`] and directly over a database transaction by
//! [`crate::editor::database::DatabaseApi`].

use crate::api::models::{
    configurations::ConfigurationResponse,
    groups::{GroupCreate, GroupResponse, GroupUpdate},
    links::{LinkCreate, LinkResponse, LinkUpdate},
};
use crate::db::errors::DbError;
use crate::storage::StorageError;
use crate::types::{ConfigurationId, GroupId, LinkId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The addressed row does not exist
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// The server answered with a non-success status
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Persistence(#[from] DbError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A response or stored value could not be interpreted
    #[error("Failed to decode {0}")]
    Decode(String),
}

impl SyncError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        SyncError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// CRUD and upload operations over groups, links, configurations and images.
#[async_trait::async_trait]
pub trait DashboardApi: Send {
    /// Groups ordered by `(orderby, id)`, each with its links nested in order
    async fn list_tree(&mut self) -> Result<Vec<GroupResponse>>;

    async fn create_group(&mut self, request: &GroupCreate) -> Result<GroupResponse>;

    async fn update_group(&mut self, id: GroupId, request: &GroupUpdate) -> Result<GroupResponse>;

    async fn delete_group(&mut self, id: GroupId) -> Result<()>;

    /// Every link, orphans included
    async fn list_links(&mut self) -> Result<Vec<LinkResponse>>;

    async fn create_link(&mut self, request: &LinkCreate) -> Result<LinkResponse>;

    async fn update_link(&mut self, id: LinkId, request: &LinkUpdate) -> Result<LinkResponse>;

    async fn delete_link(&mut self, id: LinkId) -> Result<()>;

    async fn list_configurations(&mut self) -> Result<Vec<ConfigurationResponse>>;

    async fn delete_configuration(&mut self, id: ConfigurationId) -> Result<()>;

    /// Store an image and return the filename it was stored under
    async fn upload_image(&mut self, name: &str, content: Vec<u8>) -> Result<String>;

    async fn fetch_image(&mut self, name: &str) -> Result<Vec<u8>>;

    /// Delete all links, then all groups, then all configurations.
    async fn wipe(&mut self) -> Result<()> {
        for link in self.list_links().await? {
            self.delete_link(link.id).await?;
        }
        for group in self.list_tree().await? {
            self.delete_group(group.id).await?;
        }
        for configuration in self.list_configurations().await? {
            self.delete_configuration(configuration.id).await?;
        }
        Ok(())
    }
}
