use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::group_standings;
use crate::models::{GroupStanding, SnapshotId};
use crate::params::{Param, Resolved};

use super::resolve_target;

#[derive(Debug, Deserialize)]
pub struct GroupsQuery {
    pub param: Option<String>,
    pub snapshot: Option<String>,
    pub level: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub param: String,
    pub snapshot: SnapshotId,
    pub reference: Option<SnapshotId>,
    pub groups: Vec<GroupStanding>,
}

/// Clan or brotherhood standings, scored by glory or stat sum, with
/// deltas vs. the previous snapshot.
pub async fn groups(
    State(state): State<AppState>,
    Query(query): Query<GroupsQuery>,
) -> Result<Json<GroupsResponse>, ApiError> {
    let param = match query.param.as_deref() {
        Some(name) => name
            .parse::<Param>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Param::ClansByGlory,
    };
    let (kind, scoring) = match param.resolve() {
        Resolved::Group { kind, scoring } => (kind, scoring),
        _ => {
            return Err(ApiError::BadRequest(format!(
                "{} is not a group ranking",
                param
            )));
        }
    };

    let target = resolve_target(&state.store, query.snapshot.as_deref())?;
    let reference = state.store.previous_of(&target)?;

    let groups = group_standings(
        &state.store,
        &target,
        reference.as_ref(),
        kind,
        &scoring,
        query.level,
    )?;

    Ok(Json(GroupsResponse {
        param: param.to_string(),
        snapshot: target,
        reference,
        groups,
    }))
}
