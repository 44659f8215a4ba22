//! Best single-interval gains over a trailing window.
//!
//! For every diffable metric, the best gain a hero achieved between two
//! consecutive snapshots within the window. Answering that per request
//! would mean walking every snapshot pair, so the whole answer set is
//! precomputed into an immutable [`BestWindowIndex`] that readers share
//! through an `Arc` swap. Rebuilds run serialized and never block reads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Duration;
use tracing::{debug, info};

use crate::calculate::QueryError;
use crate::models::{BestGainRow, SnapshotId, SnapshotMeta};
use crate::params::{value_of, Param, Resolved, ValueSpec};
use crate::storage::{SnapshotData, SnapshotStore};

/// Tuning knobs for the index.
#[derive(Debug, Clone)]
pub struct BestWindowConfig {
    /// Trailing window, counted back from the newest snapshot's capture time.
    pub window_days: i64,

    /// Consecutive snapshots further apart than this are not compared;
    /// a capture outage would otherwise show up as a giant "gain".
    pub max_gap_hours: f64,

    /// Rows kept per ranking bucket.
    pub cap: usize,
}

impl Default for BestWindowConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            max_gap_hours: 26.0,
            cap: 1000,
        }
    }
}

/// One immutable build of the best-gain rankings.
#[derive(Debug, Default)]
pub struct BestWindowIndex {
    /// Newest snapshot this build covers. `None` for the empty pre-build
    /// index and for an empty store.
    pub built_for: Option<SnapshotId>,

    /// Set when fewer than two snapshots fell inside the window and the
    /// walk widened to the full history (or no pair existed at all).
    pub insufficient_history: bool,

    /// Consecutive pairs actually compared.
    pub pairs_used: usize,

    buckets: HashMap<(Param, Option<u32>), Vec<BestGainRow>>,
}

impl BestWindowIndex {
    /// Ranked best gains for a metric, optionally restricted to one level.
    /// Unknown buckets (a level nobody gained at) are just empty.
    pub fn rows(&self, param: Param, level: Option<u32>) -> &[BestGainRow] {
        self.buckets
            .get(&(param, level))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Shared handle: lock-free-ish reads via `Arc` clone, rebuilds serialized
/// behind a separate mutex so a slow rebuild never stalls readers.
pub struct BestWindowCache {
    store: Arc<SnapshotStore>,
    config: BestWindowConfig,
    index: RwLock<Arc<BestWindowIndex>>,
    rebuild_lock: Mutex<()>,
}

impl BestWindowCache {
    pub fn new(store: Arc<SnapshotStore>, config: BestWindowConfig) -> Self {
        Self {
            store,
            config,
            index: RwLock::new(Arc::new(BestWindowIndex::default())),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// The index as last built. May be stale or the empty pre-build index.
    pub fn current(&self) -> Arc<BestWindowIndex> {
        self.index.read().expect("best-window index lock poisoned").clone()
    }

    /// The index, rebuilt first if the store has a newer snapshot than the
    /// one it was built for.
    pub fn ensure_current(&self) -> Result<Arc<BestWindowIndex>, QueryError> {
        let latest = self.store.latest()?.map(|m| m.id);
        let current = self.current();
        if current.built_for == latest && current.built_for.is_some() {
            return Ok(current);
        }
        self.rebuild()
    }

    /// Rebuild unconditionally and swap the new index in.
    ///
    /// Concurrent callers queue on the rebuild lock; whoever queued behind
    /// a finished rebuild re-checks staleness and reuses that result
    /// instead of building the same index again.
    pub fn rebuild(&self) -> Result<Arc<BestWindowIndex>, QueryError> {
        let _guard = self.rebuild_lock.lock().expect("rebuild lock poisoned");

        let latest = self.store.latest()?.map(|m| m.id);
        let current = self.current();
        if current.built_for == latest && current.built_for.is_some() {
            return Ok(current);
        }

        let built = Arc::new(self.build()?);
        *self.index.write().expect("best-window index lock poisoned") = built.clone();
        info!(
            built_for = ?built.built_for.as_ref().map(SnapshotId::as_str),
            pairs = built.pairs_used,
            insufficient_history = built.insufficient_history,
            "rebuilt best-window index"
        );
        Ok(built)
    }

    fn build(&self) -> Result<BestWindowIndex, QueryError> {
        let metas = self.capture_times()?;
        let Some(newest) = metas.last() else {
            return Ok(BestWindowIndex {
                built_for: None,
                insufficient_history: true,
                ..BestWindowIndex::default()
            });
        };
        let built_for = Some(newest.id.clone());

        let window_start = newest.captured_at - Duration::days(self.config.window_days);
        let in_window: Vec<&SnapshotMeta> = metas
            .iter()
            .filter(|m| m.captured_at >= window_start)
            .collect();

        // A single snapshot in the window cannot produce a pair. Widen to
        // the full history rather than answering with nothing.
        let (walk, insufficient_history) = if in_window.len() < 2 {
            (metas.iter().collect::<Vec<_>>(), true)
        } else {
            (in_window, false)
        };

        let metrics: Vec<(Param, ValueSpec)> = Param::growth_eligible()
            .into_iter()
            .filter_map(|p| match p.resolve() {
                Resolved::Value(spec) => Some((p, spec)),
                _ => None,
            })
            .collect();

        // best gain per (metric, pid), carrying the hero row from the
        // newer side of the winning pair
        let mut best: HashMap<(Param, u64), BestGainRow> = HashMap::new();
        let mut pairs_used = 0usize;

        let mut prev: Option<(&SnapshotMeta, SnapshotData)> = None;
        for meta in walk {
            let data = self.store.load(&meta.id)?;

            if let Some((prev_meta, prev_data)) = &prev {
                let gap = meta.captured_at - prev_meta.captured_at;
                let gap_hours = gap.num_seconds() as f64 / 3600.0;
                if gap_hours > self.config.max_gap_hours {
                    debug!(
                        from = prev_meta.id.as_str(),
                        to = meta.id.as_str(),
                        gap_hours,
                        "skipping pair across capture gap"
                    );
                } else {
                    pairs_used += 1;
                    accumulate_pair(&mut best, &metrics, prev_data, &data);
                }
            }
            prev = Some((meta, data));
        }

        if pairs_used == 0 {
            return Ok(BestWindowIndex {
                built_for,
                insufficient_history: true,
                pairs_used,
                buckets: HashMap::new(),
            });
        }

        Ok(BestWindowIndex {
            built_for,
            insufficient_history,
            pairs_used,
            buckets: bucketize(best, self.config.cap),
        })
    }

    /// Snapshot metas oldest first.
    fn capture_times(&self) -> Result<Vec<SnapshotMeta>, QueryError> {
        let mut metas = self.store.list()?;
        metas.reverse();
        Ok(metas)
    }
}

fn accumulate_pair(
    best: &mut HashMap<(Param, u64), BestGainRow>,
    metrics: &[(Param, ValueSpec)],
    older: &SnapshotData,
    newer: &SnapshotData,
) {
    for hero in newer.values() {
        // Only heroes present on both sides of a pair are compared; a
        // newcomer's first capture is a baseline, not a gain.
        let Some(prev) = older.get(&hero.pid) else {
            continue;
        };
        for (param, spec) in metrics {
            let gain = value_of(hero, spec) - value_of(prev, spec);
            if gain <= 0 {
                continue;
            }
            let entry = best.entry((*param, hero.pid));
            match entry {
                std::collections::hash_map::Entry::Occupied(mut slot) => {
                    // Strictly greater replaces, so the earliest interval
                    // wins ties and repeated rebuilds stay deterministic.
                    if gain > slot.get().gain {
                        slot.insert(row_for(hero, gain));
                    }
                }
                std::collections::hash_map::Entry::Vacant(slot) => {
                    slot.insert(row_for(hero, gain));
                }
            }
        }
    }
}

fn row_for(hero: &crate::models::Hero, gain: i64) -> BestGainRow {
    BestGainRow {
        pid: hero.pid,
        name: hero.name.clone(),
        level: hero.level,
        gain,
    }
}

fn bucketize(
    best: HashMap<(Param, u64), BestGainRow>,
    cap: usize,
) -> HashMap<(Param, Option<u32>), Vec<BestGainRow>> {
    let mut buckets: HashMap<(Param, Option<u32>), Vec<BestGainRow>> = HashMap::new();
    for ((param, _pid), row) in best {
        if let Some(level) = row.level {
            buckets
                .entry((param, Some(level)))
                .or_default()
                .push(row.clone());
        }
        buckets.entry((param, None)).or_default().push(row);
    }
    for rows in buckets.values_mut() {
        rows.sort_by(|a, b| b.gain.cmp(&a.gain).then(a.pid.cmp(&b.pid)));
        rows.truncate(cap);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Hero;
    use crate::storage::StorageConfig;
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::TempDir;

    fn setup(config: BestWindowConfig) -> (TempDir, Arc<SnapshotStore>, BestWindowCache) {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(SnapshotStore::new(StorageConfig::new(
            tmp.path().to_path_buf(),
        )));
        let cache = BestWindowCache::new(store.clone(), config);
        (tmp, store, cache)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn hero(pid: u64, level: u32, glory: i64) -> Hero {
        let mut h = Hero::empty(pid);
        h.name = format!("hero-{}", pid);
        h.level = Some(level);
        h.glory = glory;
        h
    }

    fn write(store: &SnapshotStore, when: DateTime<Utc>, heroes: Vec<Hero>) -> SnapshotId {
        let id = SnapshotId::for_capture(when);
        let data: SnapshotData = heroes.into_iter().map(|h| (h.pid, h)).collect();
        store.write(&id, &data).unwrap();
        id
    }

    #[test]
    fn test_best_gain_is_max_over_pairs() {
        let (_tmp, store, cache) = setup(BestWindowConfig::default());
        write(&store, at(1, 0), vec![hero(1, 5, 100)]);
        write(&store, at(2, 0), vec![hero(1, 5, 160)]); // +60
        write(&store, at(3, 0), vec![hero(1, 5, 170)]); // +10

        let index = cache.rebuild().unwrap();
        assert_eq!(index.pairs_used, 2);
        let rows = index.rows(Param::Glory, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].gain, 60);
    }

    #[test]
    fn test_non_positive_gains_are_dropped() {
        let (_tmp, store, cache) = setup(BestWindowConfig::default());
        write(&store, at(1, 0), vec![hero(1, 5, 100), hero(2, 5, 100)]);
        write(&store, at(2, 0), vec![hero(1, 5, 100), hero(2, 5, 40)]);

        let index = cache.rebuild().unwrap();
        assert!(index.rows(Param::Glory, None).is_empty());
    }

    #[test]
    fn test_gap_pairs_are_skipped() {
        let (_tmp, store, cache) = setup(BestWindowConfig {
            max_gap_hours: 26.0,
            ..BestWindowConfig::default()
        });
        write(&store, at(1, 0), vec![hero(1, 5, 100)]);
        // 48h gap: the +900 across it must not count.
        write(&store, at(3, 0), vec![hero(1, 5, 1000)]);
        write(&store, at(3, 12), vec![hero(1, 5, 1025)]);

        let index = cache.rebuild().unwrap();
        assert_eq!(index.pairs_used, 1);
        assert_eq!(index.rows(Param::Glory, None)[0].gain, 25);
    }

    #[test]
    fn test_window_excludes_old_pairs() {
        let (_tmp, store, cache) = setup(BestWindowConfig {
            window_days: 5,
            max_gap_hours: 1_000_000.0,
            ..BestWindowConfig::default()
        });
        // Outside a 5-day trailing window from day 20.
        write(&store, at(1, 0), vec![hero(1, 5, 0)]);
        write(&store, at(2, 0), vec![hero(1, 5, 500)]);
        // Inside it.
        write(&store, at(18, 0), vec![hero(1, 5, 500)]);
        write(&store, at(20, 0), vec![hero(1, 5, 530)]);

        let index = cache.rebuild().unwrap();
        assert!(!index.insufficient_history);
        assert_eq!(index.rows(Param::Glory, None)[0].gain, 30);
    }

    #[test]
    fn test_widens_when_window_too_thin() {
        let (_tmp, store, cache) = setup(BestWindowConfig {
            window_days: 2,
            max_gap_hours: 1_000_000.0,
            ..BestWindowConfig::default()
        });
        write(&store, at(1, 0), vec![hero(1, 5, 100)]);
        write(&store, at(20, 0), vec![hero(1, 5, 150)]);

        let index = cache.rebuild().unwrap();
        assert!(index.insufficient_history);
        assert_eq!(index.rows(Param::Glory, None)[0].gain, 50);
    }

    #[test]
    fn test_empty_store_builds_empty_index() {
        let (_tmp, _store, cache) = setup(BestWindowConfig::default());
        let index = cache.rebuild().unwrap();
        assert!(index.built_for.is_none());
        assert!(index.insufficient_history);
        assert!(index.rows(Param::Glory, None).is_empty());
    }

    #[test]
    fn test_level_bucket_comes_from_newer_side() {
        let (_tmp, store, cache) = setup(BestWindowConfig::default());
        write(&store, at(1, 0), vec![hero(1, 5, 100)]);
        write(&store, at(2, 0), vec![hero(1, 6, 180)]); // leveled up mid-pair

        let index = cache.rebuild().unwrap();
        assert!(index.rows(Param::Glory, Some(5)).is_empty());
        assert_eq!(index.rows(Param::Glory, Some(6))[0].gain, 80);
    }

    #[test]
    fn test_newcomer_needs_two_captures() {
        let (_tmp, store, cache) = setup(BestWindowConfig::default());
        write(&store, at(1, 0), vec![hero(1, 5, 10)]);
        // pid 2 first appears here; its 70 glory is a baseline, not a gain.
        write(&store, at(2, 0), vec![hero(1, 5, 10), hero(2, 5, 70)]);

        let index = cache.rebuild().unwrap();
        assert!(index.rows(Param::Glory, None).is_empty());

        // From its second capture on, the pid is on both sides of a pair.
        write(&store, at(3, 0), vec![hero(1, 5, 10), hero(2, 5, 95)]);
        let index = cache.rebuild().unwrap();
        let rows = index.rows(Param::Glory, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pid, 2);
        assert_eq!(rows[0].gain, 25);
    }

    #[test]
    fn test_bucket_cap_applies() {
        let (_tmp, store, cache) = setup(BestWindowConfig {
            cap: 2,
            ..BestWindowConfig::default()
        });
        let before: Vec<Hero> = (1..=5).map(|pid| hero(pid, 5, 0)).collect();
        let after: Vec<Hero> = (1..=5).map(|pid| hero(pid, 5, pid as i64 * 10)).collect();
        write(&store, at(1, 0), before);
        write(&store, at(2, 0), after);

        let index = cache.rebuild().unwrap();
        let rows = index.rows(Param::Glory, None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pid, 5);
        assert_eq!(rows[1].pid, 4);
    }

    #[test]
    fn test_ensure_current_rebuilds_after_new_snapshot() {
        let (_tmp, store, cache) = setup(BestWindowConfig::default());
        write(&store, at(1, 0), vec![hero(1, 5, 100)]);
        write(&store, at(2, 0), vec![hero(1, 5, 120)]);

        let first = cache.ensure_current().unwrap();
        assert_eq!(first.rows(Param::Glory, None)[0].gain, 20);

        // No new snapshot: same build comes back.
        let again = cache.ensure_current().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        write(&store, at(3, 0), vec![hero(1, 5, 220)]);
        let rebuilt = cache.ensure_current().unwrap();
        assert_eq!(rebuilt.rows(Param::Glory, None)[0].gain, 100);
    }

    #[test]
    fn test_stat_sum_tracked_alongside_singles() {
        let (_tmp, store, cache) = setup(BestWindowConfig::default());
        let mut before = hero(1, 5, 0);
        before.strength = 10;
        let mut after = hero(1, 5, 0);
        after.strength = 14;
        after.vitality = 3;
        write(&store, at(1, 0), vec![before]);
        write(&store, at(2, 0), vec![after]);

        let index = cache.rebuild().unwrap();
        assert_eq!(index.rows(Param::StatSum, None)[0].gain, 7);
        assert_eq!(index.rows(Param::Strength, None)[0].gain, 4);
    }
}
