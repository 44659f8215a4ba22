use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{BestGainRow, SnapshotId};
use crate::params::{Mode, Param};

use super::parse_param;

#[derive(Debug, Deserialize)]
pub struct BestQuery {
    pub param: Option<String>,
    pub level: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct BestResponse {
    pub param: String,
    pub level: Option<u32>,
    /// Newest snapshot the rankings cover.
    pub built_for: Option<SnapshotId>,
    /// True when the trailing window held fewer than two snapshots and the
    /// rankings span the full history instead.
    pub insufficient_history: bool,
    pub rows: Vec<BestGainRow>,
}

/// Best single-interval gains over the trailing window, served from the
/// precomputed index. The index is rebuilt here if a newer snapshot
/// arrived since the last build.
pub async fn best(
    State(state): State<AppState>,
    Query(query): Query<BestQuery>,
) -> Result<Json<BestResponse>, ApiError> {
    let param = Param::effective(Mode::BestWindow, parse_param(query.param.as_deref())?);

    let index = state.best.ensure_current()?;
    let cap = query
        .limit
        .unwrap_or(state.limits.max_list_len)
        .min(state.limits.max_list_len);

    let rows = index
        .rows(param, query.level)
        .iter()
        .take(cap)
        .cloned()
        .collect();

    Ok(Json(BestResponse {
        param: param.to_string(),
        level: query.level,
        built_for: index.built_for.clone(),
        insufficient_history: index.insufficient_history,
        rows,
    }))
}
