//! Route handlers.

pub mod best;
pub mod groups;
pub mod growth;
pub mod levels;
pub mod params;
pub mod ratings;
pub mod snapshots;

use crate::api::ApiError;
use crate::models::SnapshotId;
use crate::params::Param;
use crate::storage::SnapshotStore;

/// Resolve the snapshot a query targets: the one named in the request, or
/// the newest on disk.
fn resolve_target(store: &SnapshotStore, requested: Option<&str>) -> Result<SnapshotId, ApiError> {
    match requested {
        Some(name) => {
            let id = SnapshotId::new(name);
            if !store.exists(&id) {
                return Err(ApiError::NotFound(format!("snapshot {}", name)));
            }
            Ok(id)
        }
        None => store
            .latest()?
            .map(|m| m.id)
            .ok_or_else(|| ApiError::NotFound("no snapshots ingested yet".to_string())),
    }
}

/// Parse a metric name from the query string, defaulting to glory.
fn parse_param(requested: Option<&str>) -> Result<Param, ApiError> {
    match requested {
        Some(name) => name
            .parse()
            .map_err(|e: crate::params::ParamError| ApiError::BadRequest(e.to_string())),
        None => Ok(Param::Glory),
    }
}
