//! Storage for uploaded images.
//!
//! Files live flat in one directory and are addressed by their stored filename, which is what
//! a link's `imageurl` holds. The router serves the same directory under `/uploads`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Stored file {0} not found")]
    NotFound(String),

    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// How stored filenames are derived from the uploaded name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingScheme {
    /// `<unix-millis>-<name>`, never overwriting an existing file
    #[default]
    Timestamped,
    /// The sanitised original name; a later upload replaces an earlier one
    Original,
}

/// Trait for upload storage backends
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Store file content under a name derived from `original_name` and return that name
    async fn store(&self, original_name: &str, content: &[u8]) -> Result<String>;

    /// Retrieve file content by stored name
    async fn retrieve(&self, name: &str) -> Result<Vec<u8>>;
}

/// Strip directory components and replace anything outside `[A-Za-z0-9._-]` with `_`.
///
/// Names that end up empty, or consisting only of dots, are rejected.
pub fn sanitize_file_name(name: &str) -> Result<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let sanitized: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(sanitized)
}

fn unix_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default()
}

/// Local filesystem storage backend
pub struct LocalUploadStore {
    base_path: PathBuf,
    naming: NamingScheme,
}

impl LocalUploadStore {
    pub fn new(base_path: impl Into<PathBuf>, naming: NamingScheme) -> Self {
        Self {
            base_path: base_path.into(),
            naming,
        }
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let sanitized = sanitize_file_name(name)?;
        if sanitized != name {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.base_path.join(sanitized))
    }

    /// Create `name` exclusively, retrying with a counter suffix while the name is taken.
    async fn create_unique(&self, millis: u128, name: &str, content: &[u8]) -> Result<String> {
        let mut attempt = 0u32;
        loop {
            let candidate = if attempt == 0 {
                format!("{millis}-{name}")
            } else {
                format!("{millis}-{attempt}-{name}")
            };
            match fs::OpenOptions::new().write(true).create_new(true).open(self.base_path.join(&candidate)).await {
                Ok(mut file) => {
                    file.write_all(content).await?;
                    file.sync_all().await?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl UploadStore for LocalUploadStore {
    #[tracing::instrument(skip(self, content), fields(size = content.len()), err)]
    async fn store(&self, original_name: &str, content: &[u8]) -> Result<String> {
        let sanitized = sanitize_file_name(original_name)?;
        fs::create_dir_all(&self.base_path).await?;

        let stored = match self.naming {
            NamingScheme::Timestamped => self.create_unique(unix_millis(), &sanitized, content).await?,
            NamingScheme::Original => {
                let mut file = fs::File::create(self.base_path.join(&sanitized)).await?;
                file.write_all(content).await?;
                file.sync_all().await?;
                sanitized
            }
        };

        tracing::debug!(stored = %stored, "Stored upload");
        Ok(stored)
    }

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name)?;
        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
