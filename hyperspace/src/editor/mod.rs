//! Client-side editing of the dashboard.
//!
//! An [`EditorSession`] holds a [`Tree`] snapshot of every group and link and mirrors each edit
//! to a [`DashboardApi`]. The same trait lets the bundle routine run against a remote server
//! ([`crate::client::HttpDashboardClient`]) or directly against the database
//! ([`database::DatabaseApi`]).
//!
//! - [`ordering`]: pure reorder helpers
//! - [`tree`]: immutable snapshots
//! - [`session`]: the working copy and its sync rules
//! - [`api`]: the [`DashboardApi`] trait and [`SyncError`]

pub mod api;
pub mod database;
#[cfg(test)]
pub mod memory;
pub mod ordering;
pub mod session;
pub mod tree;

pub use api::{DashboardApi, SyncError};
pub use session::{EditorSession, SyncReport};
pub use tree::{GroupNode, LinkNode, Tree};
