//! Database models for configuration rows.

use crate::api::models::configurations::{ConfigurationCreate, ConfigurationUpdate};
use crate::types::ConfigurationId;

#[derive(Debug, Clone)]
pub struct ConfigurationCreateDBRequest {
    pub title: String,
    pub datavalue: Option<String>,
}

impl From<ConfigurationCreate> for ConfigurationCreateDBRequest {
    fn from(create: ConfigurationCreate) -> Self {
        Self {
            title: create.title,
            datavalue: create.datavalue,
        }
    }
}

/// Both fields are written as given; a `None` datavalue clears the value.
#[derive(Debug, Clone)]
pub struct ConfigurationUpdateDBRequest {
    pub title: String,
    pub datavalue: Option<String>,
}

impl From<ConfigurationUpdate> for ConfigurationUpdateDBRequest {
    fn from(update: ConfigurationUpdate) -> Self {
        Self {
            title: update.title,
            datavalue: update.datavalue,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationDBResponse {
    pub id: ConfigurationId,
    pub title: String,
    pub datavalue: Option<String>,
}
