use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::SnapshotMeta;

#[derive(Debug, Serialize)]
pub struct SnapshotsResponse {
    /// Newest first.
    pub snapshots: Vec<SnapshotMeta>,
    pub latest: Option<SnapshotMeta>,
}

pub async fn list_snapshots(
    State(state): State<AppState>,
) -> Result<Json<SnapshotsResponse>, ApiError> {
    let snapshots = state.store.list()?;
    let latest = snapshots.first().cloned();
    Ok(Json(SnapshotsResponse { snapshots, latest }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::cache::{BestWindowCache, BestWindowConfig};
    use crate::config::LimitsConfig;
    use crate::models::{Hero, SnapshotId};
    use crate::storage::{SnapshotData, SnapshotStore, StorageConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn setup(dir: &std::path::Path) -> AppState {
        let store = Arc::new(SnapshotStore::new(StorageConfig::new(dir.to_path_buf())));
        let limits = LimitsConfig::default();
        let best = Arc::new(BestWindowCache::new(
            store.clone(),
            BestWindowConfig::default(),
        ));
        AppState { store, best, limits }
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_list_snapshots_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup(tmp.path());

        let data: SnapshotData = [(1, Hero::empty(1))].into_iter().collect();
        state
            .store
            .write(&SnapshotId::new("heroes_2026-01-01_00-00-00"), &data)
            .unwrap();
        state
            .store
            .write(&SnapshotId::new("heroes_2026-01-02_00-00-00"), &data)
            .unwrap();

        let app = build_router(state);
        let (status, json) = get_json(app, "/api/snapshots").await;

        assert_eq!(status, StatusCode::OK);
        let snapshots = json["snapshots"].as_array().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0]["id"], "heroes_2026-01-02_00-00-00");
        assert_eq!(json["latest"]["id"], "heroes_2026-01-02_00-00-00");
    }

    #[tokio::test]
    async fn test_list_snapshots_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup(tmp.path());

        let app = build_router(state);
        let (status, json) = get_json(app, "/api/snapshots").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["snapshots"].as_array().unwrap().is_empty());
        assert!(json["latest"].is_null());
    }
}
