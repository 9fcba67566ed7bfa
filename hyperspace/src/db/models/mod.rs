//! Database record models matching table schemas.
//!
//! Requests carry the values a repository writes, responses carry the rows it read back.
//! They are distinct from the API models so the storage representation can evolve
//! independently.
//!
//! - [`groups`]: dashboard columns
//! - [`links`]: bookmarks, owned by a group
//! - [`configurations`]: key/value settings

pub mod configurations;
pub mod groups;
pub mod links;
