use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::calculate::{level_balance, level_counts, level_players as players_at_level};
use crate::models::{BalanceStats, Hero, LevelTotals, SnapshotId};

use super::resolve_target;

#[derive(Debug, Deserialize)]
pub struct LevelsQuery {
    pub snapshot: Option<String>,
}

/// One level cohort: population, population change and balance thresholds.
#[derive(Debug, Serialize)]
pub struct LevelSummary {
    pub level: u32,
    pub count: u32,
    pub count_delta: i64,
    pub eligible: bool,
    pub stats: Option<BalanceStats>,
}

#[derive(Debug, Serialize)]
pub struct LevelsResponse {
    pub snapshot: SnapshotId,
    pub reference: Option<SnapshotId>,
    /// Highest level first.
    pub levels: Vec<LevelSummary>,
    pub totals: LevelTotals,
}

pub async fn levels(
    State(state): State<AppState>,
    Query(query): Query<LevelsQuery>,
) -> Result<Json<LevelsResponse>, ApiError> {
    let target = resolve_target(&state.store, query.snapshot.as_deref())?;
    let reference = state.store.previous_of(&target)?;

    let (cohorts, totals) = level_counts(&state.store, &target, reference.as_ref())?;
    let balance = level_balance(&state.store, &target)?;

    let levels = cohorts
        .into_iter()
        .map(|cohort| {
            let b = balance.get(&cohort.level);
            LevelSummary {
                level: cohort.level,
                count: cohort.count,
                count_delta: cohort.count_delta,
                eligible: b.map(|b| b.eligible).unwrap_or(false),
                stats: b.and_then(|b| b.stats),
            }
        })
        .collect();

    Ok(Json(LevelsResponse {
        snapshot: target,
        reference,
        levels,
        totals,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LevelPlayersQuery {
    pub snapshot: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LevelPlayersResponse {
    pub snapshot: SnapshotId,
    pub level: u32,
    pub players: Vec<Hero>,
    pub pagination: PaginationMeta,
}

/// Heroes at one level, strongest base stats first.
pub async fn level_players(
    State(state): State<AppState>,
    Path(level): Path<u32>,
    Query(query): Query<LevelPlayersQuery>,
) -> Result<Json<LevelPlayersResponse>, ApiError> {
    let target = resolve_target(&state.store, query.snapshot.as_deref())?;
    let pagination = Pagination::new(
        query.page,
        query.page_size,
        state.limits.level_page_size as u32,
    );

    let (cohorts, _) = level_counts(&state.store, &target, None)?;
    let total = cohorts
        .iter()
        .find(|c| c.level == level)
        .map(|c| c.count)
        .unwrap_or(0);

    let players = players_at_level(
        &state.store,
        &target,
        level,
        pagination.offset() as usize,
        pagination.page_size as usize,
    )?;

    Ok(Json(LevelPlayersResponse {
        snapshot: target,
        level,
        players,
        pagination: PaginationMeta::new(&pagination, total),
    }))
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

    fn stat_hero(pid: u64, level: u32, stat: i64) -> Hero {
        let mut h = Hero::empty(pid);
        h.name = format!("hero-{}", pid);
        h.level = Some(level);
        h.strength = stat;
        h.defense = stat;
        h.dexterity = stat;
        h.mastery = stat;
        h.vitality = stat;
        h
    }

    fn write(state: &AppState, id: &str, heroes: Vec<Hero>) {
        let data: SnapshotData = heroes.into_iter().map(|h| (h.pid, h)).collect();
        state.store.write(&SnapshotId::new(id), &data).unwrap();
    }

    #[tokio::test]
    async fn test_levels_counts_and_thresholds() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup(tmp.path());
        write(
            &state,
            "heroes_2026-01-01_00-00-00",
            vec![stat_hero(1, 4, 100), stat_hero(2, 5, 150)],
        );

        let app = build_router(state);
        let (status, json) = get_json(app, "/api/levels").await;

        assert_eq!(status, StatusCode::OK);
        let levels = json["levels"].as_array().unwrap();
        // Highest level first.
        assert_eq!(levels[0]["level"], 5);
        assert_eq!(levels[0]["stats"]["strength"]["upper"], 115);
        assert_eq!(levels[0]["stats"]["strength"]["cap"], 112);
        assert_eq!(levels[0]["stats"]["strength"]["recommended"], 112);
        // No level 3 cohort below level 4.
        assert!(levels[1]["stats"].is_null());
        assert_eq!(json["totals"]["count"], 2);
    }

    #[tokio::test]
    async fn test_level_players_paged() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup(tmp.path());
        let heroes: Vec<Hero> = (1..=5).map(|pid| stat_hero(pid, 7, pid as i64)).collect();
        write(&state, "heroes_2026-01-01_00-00-00", heroes);

        let app = build_router(state);
        let (status, json) =
            get_json(app, "/api/levels/7/players?page=1&page_size=2").await;

        assert_eq!(status, StatusCode::OK);
        let players = json["players"].as_array().unwrap();
        assert_eq!(players.len(), 2);
        // Strongest first.
        assert_eq!(players[0]["pid"], 5);
        assert_eq!(players[1]["pid"], 4);
        assert_eq!(json["pagination"]["total_items"], 5);
        assert_eq!(json["pagination"]["total_pages"], 3);
        assert_eq!(json["pagination"]["has_next"], true);
    }

    #[tokio::test]
    async fn test_level_players_empty_cohort() {
        let tmp = tempfile::tempdir().unwrap();
        let state = setup(tmp.path());
        write(
            &state,
            "heroes_2026-01-01_00-00-00",
            vec![stat_hero(1, 4, 10)],
        );

        let app = build_router(state);
        let (status, json) = get_json(app, "/api/levels/9/players").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["players"].as_array().unwrap().is_empty());
        assert_eq!(json["pagination"]["total_items"], 0);
    }
}
