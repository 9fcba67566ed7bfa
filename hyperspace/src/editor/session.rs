//! A working copy of the dashboard tree kept in step with a [`DashboardApi`].
//!
//! Structural edits (add, rename, update, delete) are two-phase: the session switches to a
//! tentative snapshot, issues the call, then either commits the server's answer or reverts to
//! the previous snapshot and returns the error.
//!
//! Reorders are different. The new order is kept locally and every element whose rank changed
//! gets its own update call; failures are logged and reported in a [`SyncReport`] but neither
//! retried nor reverted. [`EditorSession::reload`] restores the stored order.

use crate::api::models::groups::{GroupCreate, GroupUpdate};
use crate::api::models::links::{LinkCreate, LinkUpdate};
use crate::bundle::{self, BundleError};
use crate::editor::api::{DashboardApi, Result, SyncError};
use crate::editor::ordering;
use crate::editor::tree::{GroupNode, LinkNode, Tree};
use crate::types::{GroupId, LinkId};
use tracing::{debug, instrument, warn};

/// Placeholder id of a node whose create call is in flight
const PENDING_ID: i32 = 0;

/// Outcome of persisting a reorder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Ids whose rank was written
    pub updated: Vec<i32>,
    /// Ids whose rank update failed
    pub failed: Vec<i32>,
}

impl SyncReport {
    /// Nothing moved and nothing was sent
    pub fn is_noop(&self) -> bool {
        self.updated.is_empty() && self.failed.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct EditorSession<A> {
    api: A,
    tree: Tree,
}

impl<A: DashboardApi> EditorSession<A> {
    /// Start a session from the store's current tree
    pub async fn load(mut api: A) -> Result<Self> {
        let tree = Tree::from(api.list_tree().await?);
        Ok(Self { api, tree })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn api(&mut self) -> &mut A {
        &mut self.api
    }

    pub fn into_api(self) -> A {
        self.api
    }

    /// Replace the working copy with the stored tree
    pub async fn reload(&mut self) -> Result<()> {
        self.tree = Tree::from(self.api.list_tree().await?);
        Ok(())
    }

    fn settle<T>(&mut self, previous: Tree, result: Result<T>, commit: impl FnOnce(&Tree, &T) -> Option<Tree>) -> Result<T> {
        match result {
            Ok(value) => {
                self.tree = commit(&previous, &value).unwrap_or(previous);
                Ok(value)
            }
            Err(e) => {
                debug!("Reverting tentative edit: {}", e);
                self.tree = previous;
                Err(e)
            }
        }
    }

    // Reordering

    #[instrument(skip(self))]
    pub async fn move_group(&mut self, from: usize, to: usize) -> SyncReport {
        let Some(reordered) = ordering::reorder(self.tree.groups(), from, to) else {
            return SyncReport::default();
        };
        let Some(moved) = self.tree.with_group_moved(from, to) else {
            return SyncReport::default();
        };
        let titles: Vec<(GroupId, String)> = reordered.iter().map(|g| (g.id, g.title.clone())).collect();
        let changes = ordering::rank_changes(reordered.iter().map(|g| (g.id, g.orderby)));
        self.tree = moved;

        let mut report = SyncReport::default();
        for (id, rank) in changes {
            let title = titles.iter().find(|(gid, _)| *gid == id).map(|(_, t)| t.clone()).unwrap_or_default();
            let update = GroupUpdate {
                title,
                orderby: Some(rank),
            };
            match self.api.update_group(id, &update).await {
                Ok(_) => report.updated.push(id),
                Err(e) => {
                    warn!(group_id = id, rank, "Failed to persist group rank: {}", e);
                    report.failed.push(id);
                }
            }
        }
        report
    }

    pub async fn move_group_up(&mut self, group_id: GroupId) -> SyncReport {
        match self.tree.group_position(group_id).and_then(ordering::move_up) {
            Some((from, to)) => self.move_group(from, to).await,
            None => SyncReport::default(),
        }
    }

    pub async fn move_group_down(&mut self, group_id: GroupId) -> SyncReport {
        let len = self.tree.groups().len();
        match self.tree.group_position(group_id).and_then(|i| ordering::move_down(i, len)) {
            Some((from, to)) => self.move_group(from, to).await,
            None => SyncReport::default(),
        }
    }

    /// Apply a drag of group `active` onto group `over`
    pub async fn drop_group(&mut self, active: GroupId, over: Option<GroupId>) -> SyncReport {
        let keys: Vec<GroupId> = self.tree.groups().iter().map(|g| g.id).collect();
        match ordering::resolve_drop(&keys, &active, over.as_ref()) {
            Some((from, to)) => self.move_group(from, to).await,
            None => SyncReport::default(),
        }
    }

    #[instrument(skip(self))]
    pub async fn move_link(&mut self, group_id: GroupId, from: usize, to: usize) -> SyncReport {
        let Some(group) = self.tree.group(group_id) else {
            return SyncReport::default();
        };
        let Some(reordered) = ordering::reorder(&group.links, from, to) else {
            return SyncReport::default();
        };
        let Some(moved) = self.tree.with_link_moved(group_id, from, to) else {
            return SyncReport::default();
        };
        let changes = ordering::rank_changes(reordered.iter().map(|l| (l.id, l.orderby)));
        self.tree = moved;

        let mut report = SyncReport::default();
        for (id, rank) in changes {
            let Some(link) = reordered.iter().find(|l| l.id == id) else {
                continue;
            };
            let update = LinkUpdate {
                group_id: None,
                title: link.title.clone(),
                link: link.link.clone(),
                imageurl: None,
                notes: None,
                orderby: Some(rank),
            };
            match self.api.update_link(id, &update).await {
                Ok(_) => report.updated.push(id),
                Err(e) => {
                    warn!(link_id = id, rank, "Failed to persist link rank: {}", e);
                    report.failed.push(id);
                }
            }
        }
        report
    }

    pub async fn move_link_up(&mut self, link_id: LinkId) -> SyncReport {
        match self.tree.locate_link(link_id) {
            Some((group_id, index)) => match ordering::move_up(index) {
                Some((from, to)) => self.move_link(group_id, from, to).await,
                None => SyncReport::default(),
            },
            None => SyncReport::default(),
        }
    }

    pub async fn move_link_down(&mut self, link_id: LinkId) -> SyncReport {
        let Some((group_id, index)) = self.tree.locate_link(link_id) else {
            return SyncReport::default();
        };
        let len = self.tree.group(group_id).map(|g| g.links.len()).unwrap_or_default();
        match ordering::move_down(index, len) {
            Some((from, to)) => self.move_link(group_id, from, to).await,
            None => SyncReport::default(),
        }
    }

    /// Apply a drag of link `active` onto link `over`. Links only move within their own group.
    pub async fn drop_link(&mut self, active: LinkId, over: Option<LinkId>) -> SyncReport {
        let Some((group_id, _)) = self.tree.locate_link(active) else {
            return SyncReport::default();
        };
        let keys: Vec<LinkId> = self
            .tree
            .group(group_id)
            .map(|g| g.links.iter().map(|l| l.id).collect())
            .unwrap_or_default();
        match ordering::resolve_drop(&keys, &active, over.as_ref()) {
            Some((from, to)) => self.move_link(group_id, from, to).await,
            None => SyncReport::default(),
        }
    }

    // Structural edits

    /// Append a group at the end of the dashboard
    #[instrument(skip(self))]
    pub async fn add_group(&mut self, title: &str) -> Result<GroupId> {
        let previous = self.tree.clone();
        let orderby = previous.next_group_rank();
        self.tree = previous.with_group_appended(GroupNode {
            id: PENDING_ID,
            title: title.to_string(),
            orderby,
            links: Vec::new(),
        });

        let request = GroupCreate {
            title: title.to_string(),
            orderby: Some(orderby),
        };
        let result = self.api.create_group(&request).await;
        let created = self.settle(previous, result, |tree, created| {
            Some(tree.with_group_appended(GroupNode::from(created.clone())))
        })?;
        Ok(created.id)
    }

    #[instrument(skip(self))]
    pub async fn rename_group(&mut self, group_id: GroupId, title: &str) -> Result<()> {
        let previous = self.tree.clone();
        let current = previous.group(group_id).cloned().ok_or_else(|| SyncError::not_found("Group", group_id))?;
        let tentative = GroupNode {
            title: title.to_string(),
            ..current.clone()
        };
        if let Some(tree) = previous.with_group_replaced(tentative) {
            self.tree = tree;
        }

        let request = GroupUpdate {
            title: title.to_string(),
            orderby: Some(current.orderby),
        };
        let result = self.api.update_group(group_id, &request).await;
        self.settle(previous, result, |tree, updated| {
            tree.with_group_replaced(GroupNode {
                id: updated.id,
                title: updated.title.clone(),
                orderby: updated.orderby,
                links: Vec::new(),
            })
        })?;
        Ok(())
    }

    /// Delete a group. Its links stay in the store as orphans and leave the tree.
    #[instrument(skip(self))]
    pub async fn delete_group(&mut self, group_id: GroupId) -> Result<()> {
        let previous = self.tree.clone();
        self.tree = previous.without_group(group_id).ok_or_else(|| SyncError::not_found("Group", group_id))?;

        let result = self.api.delete_group(group_id).await;
        self.settle(previous, result, |tree, _| tree.without_group(group_id))
    }

    /// Append a link at the end of `request.group_id`
    #[instrument(skip(self, request), fields(group_id = request.group_id))]
    pub async fn add_link(&mut self, mut request: LinkCreate) -> Result<LinkId> {
        let previous = self.tree.clone();
        let group = previous
            .group(request.group_id)
            .ok_or_else(|| SyncError::not_found("Group", request.group_id))?;
        let orderby = request.orderby.unwrap_or(group.next_link_rank());
        request.orderby = Some(orderby);

        let tentative = LinkNode {
            id: PENDING_ID,
            group_id: Some(request.group_id),
            title: request.title.clone(),
            link: request.link.clone(),
            imageurl: request.imageurl.clone(),
            notes: request.notes.clone(),
            orderby,
        };
        if let Some(tree) = previous.with_link_appended(request.group_id, tentative) {
            self.tree = tree;
        }

        let group_id = request.group_id;
        let result = self.api.create_link(&request).await;
        let created = self.settle(previous, result, |tree, created| {
            tree.with_link_appended(group_id, LinkNode::from(created.clone()))
        })?;
        Ok(created.id)
    }

    #[instrument(skip(self, request))]
    pub async fn update_link(&mut self, link_id: LinkId, request: LinkUpdate) -> Result<()> {
        let previous = self.tree.clone();
        let (group_id, position) = previous.locate_link(link_id).ok_or_else(|| SyncError::not_found("Link", link_id))?;
        let current = previous.group(group_id).map(|g| g.links[position].clone()).ok_or_else(|| SyncError::not_found("Link", link_id))?;

        let tentative = LinkNode {
            id: link_id,
            group_id: request.group_id.or(current.group_id),
            title: request.title.clone(),
            link: request.link.clone(),
            imageurl: match &request.imageurl {
                Some(s) if s.is_empty() => None,
                Some(s) => Some(s.clone()),
                None => current.imageurl.clone(),
            },
            notes: match &request.notes {
                Some(s) if s.is_empty() => None,
                Some(s) => Some(s.clone()),
                None => current.notes.clone(),
            },
            orderby: request.orderby.unwrap_or(current.orderby),
        };
        if let Some(tree) = previous.with_link_replaced(tentative) {
            self.tree = tree;
        }

        let result = self.api.update_link(link_id, &request).await;
        self.settle(previous, result, |tree, updated| tree.with_link_replaced(LinkNode::from(updated.clone())))?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_link(&mut self, link_id: LinkId) -> Result<()> {
        let previous = self.tree.clone();
        self.tree = previous.without_link(link_id).ok_or_else(|| SyncError::not_found("Link", link_id))?;

        let result = self.api.delete_link(link_id).await;
        self.settle(previous, result, |tree, _| tree.without_link(link_id))
    }

    // Bundles

    /// Export the working copy and its images as a zip bundle
    pub async fn export(&mut self) -> std::result::Result<Vec<u8>, BundleError> {
        bundle::export(&mut self.api, &self.tree).await
    }

    /// Replace everything in the store with the bundle's contents and adopt the stored result
    pub async fn import(&mut self, archive: &[u8]) -> std::result::Result<(), BundleError> {
        self.tree = bundle::import(&mut self.api, archive).await?;
        Ok(())
    }
}
