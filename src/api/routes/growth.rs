use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::growth_between;
use crate::models::{GrowthRow, SnapshotId};
use crate::params::{Mode, Param};

use super::{parse_param, resolve_target};

#[derive(Debug, Deserialize)]
pub struct GrowthQuery {
    pub param: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub level: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GrowthResponse {
    pub param: String,
    pub from: SnapshotId,
    pub to: SnapshotId,
    pub rows: Vec<GrowthRow>,
}

/// Ranking by metric change between two snapshots. Defaults to the newest
/// snapshot vs. the one before it; a non-diffable metric (stale form
/// state) silently becomes glory.
pub async fn growth(
    State(state): State<AppState>,
    Query(query): Query<GrowthQuery>,
) -> Result<Json<GrowthResponse>, ApiError> {
    let param = Param::effective(Mode::Growth, parse_param(query.param.as_deref())?);

    let to = resolve_target(&state.store, query.to.as_deref())?;
    let from = match query.from.as_deref() {
        Some(name) => {
            let id = SnapshotId::new(name);
            if !state.store.exists(&id) {
                return Err(ApiError::NotFound(format!("snapshot {}", name)));
            }
            id
        }
        // Only one snapshot on disk: diff against itself, all zeroes.
        None => state.store.previous_of(&to)?.unwrap_or_else(|| to.clone()),
    };

    let cap = query
        .limit
        .unwrap_or(state.limits.max_list_len)
        .min(state.limits.max_list_len);

    let rows = growth_between(&state.store, &from, &to, param, query.level, cap)?;

    Ok(Json(GrowthResponse {
        param: param.to_string(),
        from,
        to,
        rows,
    }))
}
