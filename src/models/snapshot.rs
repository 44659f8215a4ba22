//! Snapshot identity and ordering.
//!
//! A snapshot id is the filename stem of the capture file,
//! `heroes_YYYY-MM-DD_HH-MM-SS`. The pattern is lexicographically sortable,
//! so id order and capture order agree.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The timestamp embedded in a snapshot id could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed snapshot id: {0}")]
pub struct MalformedSnapshotId(pub String);

fn id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"heroes_(\d{4}-\d{2}-\d{2})_(\d{2})-(\d{2})-(\d{2})").expect("valid pattern")
    })
}

/// Identifier of one snapshot. Encodes the capture timestamp.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the id for a capture taken at the given instant.
    pub fn for_capture(at: DateTime<Utc>) -> Self {
        Self(format!("heroes_{}", at.format("%Y-%m-%d_%H-%M-%S")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the capture timestamp out of the id.
    pub fn captured_at(&self) -> Result<DateTime<Utc>, MalformedSnapshotId> {
        let caps = id_pattern()
            .captures(&self.0)
            .ok_or_else(|| MalformedSnapshotId(self.0.clone()))?;
        let text = format!("{} {}:{}:{}", &caps[1], &caps[2], &caps[3], &caps[4]);
        let naive = NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S")
            .map_err(|_| MalformedSnapshotId(self.0.clone()))?;
        Ok(naive.and_utc())
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SnapshotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SnapshotId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A snapshot id together with its parsed capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub id: SnapshotId,
    pub captured_at: DateTime<Utc>,
}

impl SnapshotMeta {
    /// Build metadata for an id, failing if the timestamp is unparsable.
    pub fn from_id(id: SnapshotId) -> Result<Self, MalformedSnapshotId> {
        let captured_at = id.captured_at()?;
        Ok(Self { id, captured_at })
    }
}
