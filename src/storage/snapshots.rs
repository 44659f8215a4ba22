//! Reading and writing snapshot files.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::models::{Hero, SnapshotId, SnapshotMeta};

/// The heroes of one snapshot, keyed by pid.
pub type SnapshotData = BTreeMap<u64, Hero>;

/// Ordered access to the snapshot history on disk.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    config: StorageConfig,
}

impl SnapshotStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn path_of(&self, id: &SnapshotId) -> PathBuf {
        self.config.snapshots_dir().join(format!("{}.json", id))
    }

    /// List all snapshots, newest first.
    ///
    /// Files whose names don't carry a parsable timestamp are skipped with
    /// a warning; one stray file must never take down the whole listing.
    pub fn list(&self) -> Result<Vec<SnapshotMeta>, StorageError> {
        let dir = self.config.snapshots_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut metas = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };

            let id = SnapshotId::new(stem);
            match SnapshotMeta::from_id(id) {
                Ok(meta) => metas.push(meta),
                Err(e) => warn!("Skipping snapshot file {:?}: {}", name, e),
            }
        }

        metas.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        debug!("Listed {} snapshots", metas.len());
        Ok(metas)
    }

    /// The newest snapshot, if any exist.
    pub fn latest(&self) -> Result<Option<SnapshotMeta>, StorageError> {
        Ok(self.list()?.into_iter().next())
    }

    /// The snapshot immediately older than the given one.
    pub fn previous_of(&self, id: &SnapshotId) -> Result<Option<SnapshotId>, StorageError> {
        let metas = self.list()?;
        let pos = metas.iter().position(|m| &m.id == id);
        Ok(pos
            .and_then(|i| metas.get(i + 1))
            .map(|m| m.id.clone()))
    }

    pub fn exists(&self, id: &SnapshotId) -> bool {
        self.path_of(id).exists()
    }

    /// Load one snapshot's hero rows.
    pub fn load(&self, id: &SnapshotId) -> Result<SnapshotData, StorageError> {
        let path = self.path_of(id);
        if !path.exists() {
            return Err(StorageError::SnapshotNotFound(id.clone()));
        }

        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let data: SnapshotData = serde_json::from_reader(reader)?;
        debug!("Loaded snapshot {} ({} heroes)", id, data.len());
        Ok(data)
    }

    /// Write one snapshot. Overwrites any existing file for the same id.
    pub fn write(&self, id: &SnapshotId, data: &SnapshotData) -> Result<(), StorageError> {
        let dir = self.config.snapshots_dir();
        fs::create_dir_all(&dir)?;

        let path = self.path_of(id);
        let file = File::create(&path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, data)?;
        info!("Wrote snapshot {} ({} heroes)", id, data.len());
        Ok(())
    }

    /// Drop the oldest snapshots, keeping the newest `keep`.
    /// Returns the ids removed.
    pub fn prune(&self, keep: usize) -> Result<Vec<SnapshotId>, StorageError> {
        let metas = self.list()?;
        let mut removed = Vec::new();

        for meta in metas.into_iter().skip(keep) {
            fs::remove_file(self.path_of(&meta.id))?;
            info!("Pruned snapshot {}", meta.id);
            removed.push(meta.id);
        }

        Ok(removed)
    }
}
