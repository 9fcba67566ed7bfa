//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The file path
//! defaults to `config.yaml` but can be set with the `-f` flag or the `HYPERSPACE_CONFIG`
//! environment variable. A missing file is fine: every field has a default.
//!
//! ## Loading Priority
//!
//! Later sources override earlier ones:
//!
//! 1. **YAML config file** - base configuration (default: `config.yaml`)
//! 2. **`HYPERSPACE_` variables** - e.g. `HYPERSPACE_UPLOADS__DIR=/data/uploads`
//! 3. **`DATABASE_URL`** - overrides `database.url`
//! 4. **Deployment variables** - `PORT`, `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
//!
//! ## Sections
//!
//! - **Server**: `host`, `port`
//! - **Database**: `database.url` or `database.host`/`port`/`user`/`password`/`name`, plus `database.pool`
//! - **Uploads**: `uploads.dir`, `uploads.naming`, `uploads.max_file_size`, `uploads.max_bundle_size`
//! - **CORS**: `cors.allowed_origins`, `cors.max_age`
//! - **Dashboard**: `dashboard.settings_group`, `dashboard.background_title`, `dashboard.default_background`
//! - **Client**: `client.api_url`, used by the command-line subcommands

use clap::{Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::{path::PathBuf, str::FromStr, time::Duration};
use url::Url;

use crate::errors::Error;
use crate::storage::NamingScheme;
use crate::types::GroupId;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "HYPERSPACE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,

    /// Base URL of a running server, overriding `client.api_url`
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    /// Arguments for loading `path` and serving
    pub fn with_config(path: impl Into<String>) -> Self {
        Self {
            config: path.into(),
            validate: false,
            api_url: None,
            command: None,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Download every group, link and referenced image into a zip bundle
    Export {
        /// Output path, defaults to `hyperspace-export-<timestamp>.zip`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all groups, links and configurations with the contents of a bundle
    Import {
        /// Zip bundle produced by `export`
        file: PathBuf,
    },
    /// Move the group at position FROM to position TO
    MoveGroup { from: usize, to: usize },
    /// Move a link within its group from position FROM to position TO
    MoveLink { group_id: GroupId, from: usize, to: usize },
}

/// Main application configuration.
///
/// All fields have defaults so an empty file (or no file) yields a working local setup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection settings
    pub database: DatabaseConfig,
    /// Uploaded image storage
    pub uploads: UploadsConfig,
    pub cors: CorsConfig,
    /// Rendering of the `/` dashboard
    pub dashboard: DashboardConfig,
    /// Settings for the command-line client subcommands
    pub client: ClientConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3003,
            database: DatabaseConfig::default(),
            uploads: UploadsConfig::default(),
            cors: CorsConfig::default(),
            dashboard: DashboardConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

/// Connection pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

impl PoolSettings {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        (self.max_lifetime_secs > 0).then(|| Duration::from_secs(self.max_lifetime_secs))
    }
}

/// PostgreSQL connection settings. A `url` wins over the individual components.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub name: String,
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            name: "hyperspace".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url);
        }

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }
}

/// Uploaded image storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsConfig {
    /// Directory holding uploaded files, served under `/uploads`
    pub dir: PathBuf,
    /// Stored filename scheme
    pub naming: NamingScheme,
    /// Largest accepted `POST /upload` file, in bytes
    pub max_file_size: usize,
    /// Largest accepted `POST /import` bundle, in bytes
    pub max_bundle_size: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            naming: NamingScheme::Timestamped,
            max_file_size: 10 * 1024 * 1024,
            max_bundle_size: 100 * 1024 * 1024,
        }
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            max_age: Some(3600),
        }
    }
}

/// CORS origin specification.
///
/// Can be either a wildcard (`*`) to allow all origins, or a specific URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://start.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

/// Dashboard rendering conventions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Group holding settings links; hidden from the dashboard
    pub settings_group: String,
    /// Title of the configuration row or settings link selecting the background
    pub background_title: String,
    /// Background used when nothing is configured
    pub default_background: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            settings_group: "Settings".to_string(),
            background_title: "Background Image".to_string(),
            default_background: "/background.jpg".to_string(),
        }
    }
}

/// Command-line client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the server the subcommands talk to
    pub api_url: String,
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3003/".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(api_url) = &args.api_url {
            config.client.api_url = api_url.clone();
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.uploads.dir.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: uploads.dir cannot be empty".to_string(),
            });
        }

        if self.uploads.max_file_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_file_size must be positive".to_string(),
            });
        }

        if self.uploads.max_bundle_size == 0 {
            return Err(Error::Internal {
                operation: "Config validation: uploads.max_bundle_size must be positive".to_string(),
            });
        }

        if self.dashboard.settings_group.trim().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: dashboard.settings_group cannot be empty".to_string(),
            });
        }

        if self.database.pool.max_connections == 0 {
            return Err(Error::Internal {
                operation: "Config validation: database.pool.max_connections must be positive".to_string(),
            });
        }

        if self.database.pool.min_connections > self.database.pool.max_connections {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: database.pool.min_connections ({}) cannot be greater than max_connections ({})",
                    self.database.pool.min_connections, self.database.pool.max_connections
                ),
            });
        }

        if let Err(e) = Url::parse(&self.client.api_url) {
            return Err(Error::Internal {
                operation: format!("Config validation: client.api_url is not a valid URL: {e}"),
            });
        }

        if self.cors.allowed_origins.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: CORS allowed_origins cannot be empty. Add at least one allowed origin.".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("HYPERSPACE_").split("__").ignore(&["config"]))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            // Variables used by existing deployments
            .merge(Env::raw().only(&["PORT"]))
            .merge(
                Env::raw()
                    .only(&["DB_HOST", "DB_PORT", "DB_USER", "DB_PASSWORD", "DB_NAME"])
                    .map(|key| key.as_str().to_ascii_lowercase().replacen("db_", "database.", 1).into()),
            )
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
