use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::params::{Mode, Param};

#[derive(Debug, Deserialize)]
pub struct ParamsQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ParamsResponse {
    pub mode: Mode,
    pub params: Vec<String>,
}

/// The metrics selectable in a mode, in display order.
pub async fn list_params(
    State(_state): State<AppState>,
    Query(query): Query<ParamsQuery>,
) -> Result<Json<ParamsResponse>, ApiError> {
    let mode = match query.mode.as_deref() {
        None | Some("overall") => Mode::Overall,
        Some("growth") => Mode::Growth,
        Some("best_window") => Mode::BestWindow,
        Some(other) => {
            return Err(ApiError::BadRequest(format!("unknown mode: {}", other)));
        }
    };

    let params = Param::selectable(mode)
        .into_iter()
        .map(|p| p.to_string())
        .collect();

    Ok(Json(ParamsResponse { mode, params }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::cache::{BestWindowCache, BestWindowConfig};
    use crate::config::LimitsConfig;
    use crate::storage::{SnapshotStore, StorageConfig};
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
    async fn test_overall_lists_all_params() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup(tmp.path()));

        let (status, json) = get_json(app, "/api/params").await;

        assert_eq!(status, StatusCode::OK);
        let params = json["params"].as_array().unwrap();
        assert_eq!(params.len(), 21);
        assert_eq!(params[0], "glory");
        assert!(params.iter().any(|p| p == "clans_by_glory"));
    }

    #[tokio::test]
    async fn test_growth_excludes_group_and_level_views() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup(tmp.path()));

        let (status, json) = get_json(app, "/api/params?mode=growth").await;

        assert_eq!(status, StatusCode::OK);
        let params = json["params"].as_array().unwrap();
        assert_eq!(params.len(), 16);
        assert!(!params.iter().any(|p| p == "by_level"));
        assert!(!params.iter().any(|p| p == "clans_by_glory"));
    }

    #[tokio::test]
    async fn test_unknown_mode_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(setup(tmp.path()));

        let (status, json) = get_json(app, "/api/params?mode=sideways").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }
}
