//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection (or a transaction, which derefs to one), binds its
//! parameters and returns models from [`crate::db::models`].
//!
//! - [`Groups`]: dashboard groups
//! - [`Links`]: links, ordered within their group
//! - [`Configurations`]: key/value settings rows
//!
//! ```ignore
//! use hyperspace::db::handlers::{Groups, Repository};
//!
//! let mut tx = pool.begin().await?;
//! let groups = Groups::new(&mut tx).list(&GroupFilter::new()).await?;
//! tx.commit().await?;
//! ```

pub mod configurations;
pub mod groups;
pub mod links;
pub mod repository;

pub use configurations::Configurations;
pub use groups::Groups;
pub use links::Links;
pub use repository::Repository;
