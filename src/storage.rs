//! Catalog persistence
//!
//! The catalog is a single JSON array rewritten in full on every add.
//!
//! [`JsonFileStore::save`] is a read-modify-write with no locking and no
//! atomic rename: two concurrent adds can lose one course (last writer wins)
//! or leave a torn file. Acceptable for a single-user demo; put a real store
//! behind [`CatalogStore`] before running this with concurrent writers.

use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::models::Course;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every course in stored order. Empty if nothing has been saved yet.
    async fn load(&self) -> Result<Vec<Course>, StorageError>;

    /// Append one course
    async fn save(&self, course: Course) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn corrupt(&self, source: serde_json::Error) -> StorageError {
        StorageError::Corrupt {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Course>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e))
    }

    async fn save(&self, course: Course) -> Result<(), StorageError> {
        let mut catalog = self.load().await?;
        catalog.push(course);

        let bytes = to_pretty_json(&catalog).map_err(|e| self.corrupt(e))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| self.io_error(e))
    }
}

/// Four-space indented JSON
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}
