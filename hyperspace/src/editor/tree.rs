//! Immutable snapshot of the group/link tree held by an editor session.
//!
//! Every update returns a new [`Tree`]; the previous snapshot stays valid so a failed API call
//! can be undone by keeping the old value. The serialized form is the `data.json` document of an
//! export bundle: a JSON array of groups with nested `links`.

use crate::api::models::groups::GroupResponse;
use crate::api::models::links::LinkResponse;
use crate::editor::ordering;
use crate::types::{GroupId, LinkId};
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like a missing field; older exports write `"orderby": null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkNode {
    pub id: LinkId,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub imageurl: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub orderby: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    pub id: GroupId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub orderby: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<LinkNode>,
}

impl From<LinkResponse> for LinkNode {
    fn from(link: LinkResponse) -> Self {
        Self {
            id: link.id,
            group_id: link.group_id,
            title: link.title,
            link: link.link,
            imageurl: link.imageurl,
            notes: link.notes,
            orderby: link.orderby,
        }
    }
}

impl From<GroupResponse> for GroupNode {
    fn from(group: GroupResponse) -> Self {
        Self {
            id: group.id,
            title: group.title,
            orderby: group.orderby,
            links: group.links.unwrap_or_default().into_iter().map(LinkNode::from).collect(),
        }
    }
}

/// Groups in display order, each with its links in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    groups: Vec<GroupNode>,
}

impl GroupNode {
    /// Rank that sorts after every link of this group, even when stored ranks have gaps
    pub fn next_link_rank(&self) -> i32 {
        self.links.iter().map(|l| l.orderby + 1).max().unwrap_or(0)
    }
}

impl From<Vec<GroupResponse>> for Tree {
    fn from(groups: Vec<GroupResponse>) -> Self {
        Self::new(groups.into_iter().map(GroupNode::from).collect())
    }
}

impl Tree {
    pub fn new(groups: Vec<GroupNode>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[GroupNode] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<GroupNode> {
        self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rank that sorts after every group, even when stored ranks have gaps or ties
    pub fn next_group_rank(&self) -> i32 {
        self.groups.iter().map(|g| g.orderby + 1).max().unwrap_or(0)
    }

    pub fn group(&self, id: GroupId) -> Option<&GroupNode> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_position(&self, id: GroupId) -> Option<usize> {
        self.groups.iter().position(|g| g.id == id)
    }

    /// The group holding `link_id` and the link's position within it
    pub fn locate_link(&self, link_id: LinkId) -> Option<(GroupId, usize)> {
        self.groups
            .iter()
            .find_map(|g| g.links.iter().position(|l| l.id == link_id).map(|pos| (g.id, pos)))
    }

    /// Distinct, non-empty image filenames in first-seen order
    pub fn referenced_images(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for image in self.groups.iter().flat_map(|g| &g.links).filter_map(|l| l.imageurl.as_deref()) {
            if !image.is_empty() && !seen.iter().any(|s: &String| s == image) {
                seen.push(image.to_string());
            }
        }
        seen
    }

    /// Snapshot with the group at `from` moved to `to` and group ranks set to positions
    pub fn with_group_moved(&self, from: usize, to: usize) -> Option<Tree> {
        let mut groups = ordering::reorder(&self.groups, from, to)?;
        for (position, group) in groups.iter_mut().enumerate() {
            group.orderby = position as i32;
        }
        Some(Tree { groups })
    }

    /// Snapshot with a link moved within its group and that group's link ranks set to positions
    pub fn with_link_moved(&self, group_id: GroupId, from: usize, to: usize) -> Option<Tree> {
        let index = self.group_position(group_id)?;
        let mut links = ordering::reorder(&self.groups[index].links, from, to)?;
        for (position, link) in links.iter_mut().enumerate() {
            link.orderby = position as i32;
        }
        let mut groups = self.groups.clone();
        groups[index].links = links;
        Some(Tree { groups })
    }

    pub fn with_group_appended(&self, group: GroupNode) -> Tree {
        let mut groups = self.groups.clone();
        groups.push(group);
        Tree { groups }
    }

    /// Snapshot with the group's title and rank replaced; links are kept
    pub fn with_group_replaced(&self, group: GroupNode) -> Option<Tree> {
        let index = self.group_position(group.id)?;
        let mut groups = self.groups.clone();
        groups[index].title = group.title;
        groups[index].orderby = group.orderby;
        Some(Tree { groups })
    }

    pub fn without_group(&self, id: GroupId) -> Option<Tree> {
        let index = self.group_position(id)?;
        let mut groups = self.groups.clone();
        groups.remove(index);
        Some(Tree { groups })
    }

    pub fn with_link_appended(&self, group_id: GroupId, link: LinkNode) -> Option<Tree> {
        let index = self.group_position(group_id)?;
        let mut groups = self.groups.clone();
        groups[index].links.push(link);
        Some(Tree { groups })
    }

    /// Snapshot with a link replaced in place, or moved to the end of its new group when its
    /// `group_id` changed. A link whose new group is not in the tree is dropped.
    pub fn with_link_replaced(&self, link: LinkNode) -> Option<Tree> {
        let (current_group, position) = self.locate_link(link.id)?;
        let mut groups = self.groups.clone();
        let target = link.group_id.unwrap_or(current_group);

        if target == current_group {
            let index = self.group_position(current_group)?;
            groups[index].links[position] = link;
        } else {
            let index = self.group_position(current_group)?;
            groups[index].links.remove(position);
            if let Some(target_index) = self.group_position(target) {
                groups[target_index].links.push(link);
            }
        }
        Some(Tree { groups })
    }

    pub fn without_link(&self, link_id: LinkId) -> Option<Tree> {
        let (group_id, position) = self.locate_link(link_id)?;
        let index = self.group_position(group_id)?;
        let mut groups = self.groups.clone();
        groups[index].links.remove(position);
        Some(Tree { groups })
    }
}
