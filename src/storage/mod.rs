//! Filesystem snapshot store.
//!
//! Snapshots live as JSON files under `data/snapshots/`, one file per
//! capture, named by their snapshot id. Raw scraped attribute bags land in
//! `data/raw/` and are normalized by the ingest module before they enter
//! the store. Snapshots are immutable once written.

mod snapshots;

pub use snapshots::*;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::SnapshotId;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(SnapshotId),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.snapshots_dir(), PathBuf::from("/data/snapshots"));
        assert_eq!(config.raw_dir(), PathBuf::from("/data/raw"));
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
