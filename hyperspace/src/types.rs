//! Common type definitions.
//!
//! All entity IDs are `SERIAL` integers in the database and are wrapped in type aliases so
//! signatures say which table an ID belongs to:
//!
//! - [`GroupId`]: dashboard group (column) identifier
//! - [`LinkId`]: bookmark identifier
//! - [`ConfigurationId`]: key/value setting identifier

pub type GroupId = i32;
pub type LinkId = i32;
pub type ConfigurationId = i32;
