use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::overall_rating;
use crate::models::{RatingRow, SnapshotId};
use crate::params::{Param, Resolved};

use super::{parse_param, resolve_target};

#[derive(Debug, Deserialize)]
pub struct RatingsQuery {
    pub param: Option<String>,
    pub snapshot: Option<String>,
    pub reference: Option<String>,
    pub level: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RatingsResponse {
    pub param: String,
    pub snapshot: SnapshotId,
    pub reference: Option<SnapshotId>,
    pub rows: Vec<RatingRow>,
}

/// Point-in-time ranking of every hero by one metric, with deltas vs. the
/// previous snapshot (or an explicit reference).
pub async fn ratings(
    State(state): State<AppState>,
    Query(query): Query<RatingsQuery>,
) -> Result<Json<RatingsResponse>, ApiError> {
    let param = parse_param(query.param.as_deref())?;
    let spec = match param.resolve() {
        Resolved::Value(spec) => spec,
        Resolved::Group { .. } => {
            return Err(ApiError::BadRequest(format!(
                "{} is a group ranking, use /api/groups",
                param
            )));
        }
        Resolved::ByLevel => {
            return Err(ApiError::BadRequest(
                "by_level is the level view, use /api/levels".to_string(),
            ));
        }
    };

    let target = resolve_target(&state.store, query.snapshot.as_deref())?;
    let reference = match query.reference.as_deref() {
        Some(name) => {
            let id = SnapshotId::new(name);
            if !state.store.exists(&id) {
                return Err(ApiError::NotFound(format!("snapshot {}", name)));
            }
            Some(id)
        }
        None => state.store.previous_of(&target)?,
    };

    let cap = query
        .limit
        .unwrap_or(state.limits.max_list_len)
        .min(state.limits.max_list_len);

    let rows = overall_rating(
        &state.store,
        &target,
        reference.as_ref(),
        &spec,
        query.level,
        cap,
    )?;

    Ok(Json(RatingsResponse {
        param: param.to_string(),
        snapshot: target,
        reference,
        rows,
    }))
}
