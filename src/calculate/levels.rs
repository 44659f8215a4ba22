//! Level cohort analysis: population counts and stat balance thresholds.

use std::collections::BTreeMap;

use crate::models::{
    BalanceStats, Hero, LevelBalance, LevelCount, LevelTotals, SnapshotId, StatThreshold,
    BASE_STATS,
};
use crate::storage::{SnapshotData, SnapshotStore};

use super::QueryError;

/// Cohorts below this population are hidden by the UI (never skipped here).
pub const ELIGIBLE_MIN_COUNT: u32 = 20;

const UPPER_FACTOR: f64 = 1.15;
const CAP_FACTOR: f64 = 0.75;

/// Count heroes per level, with deltas vs. a reference snapshot.
/// Heroes without a level are not counted. Returns cohorts sorted by
/// level descending, plus grand totals.
pub fn level_counts(
    store: &SnapshotStore,
    target: &SnapshotId,
    reference: Option<&SnapshotId>,
) -> Result<(Vec<LevelCount>, LevelTotals), QueryError> {
    let current = store.load(target)?;
    let previous = match reference {
        Some(id) => Some(store.load(id)?),
        None => None,
    };

    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for hero in current.values() {
        if let Some(level) = hero.level {
            *counts.entry(level).or_default() += 1;
        }
    }

    let mut prev_counts: BTreeMap<u32, u32> = BTreeMap::new();
    if let Some(prev) = &previous {
        for hero in prev.values() {
            if let Some(level) = hero.level {
                *prev_counts.entry(level).or_default() += 1;
            }
        }
    }

    let mut totals = LevelTotals::default();
    let mut cohorts = Vec::with_capacity(counts.len());
    for (&level, &count) in counts.iter().rev() {
        let prev = prev_counts.get(&level).copied().unwrap_or(0);
        totals.count += count;
        totals.prev_count += prev;
        cohorts.push(LevelCount {
            level,
            count,
            count_delta: count as i64 - prev as i64,
        });
    }
    totals.delta = totals.count as i64 - totals.prev_count as i64;

    Ok((cohorts, totals))
}

struct StatAccumulator {
    count: u32,
    sums: [i64; 5],
    maxes: [i64; 5],
}

impl StatAccumulator {
    fn new() -> Self {
        Self {
            count: 0,
            sums: [0; 5],
            maxes: [0; 5],
        }
    }

    fn add(&mut self, hero: &Hero) {
        self.count += 1;
        for (i, stat) in BASE_STATS.iter().enumerate() {
            let v = hero.attr(*stat);
            self.sums[i] += v;
            if v > self.maxes[i] {
                self.maxes[i] = v;
            }
        }
    }

    fn avg(&self, i: usize) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sums[i] as f64 / self.count as f64
        }
    }
}

fn threshold(below_avg: f64, level_max: i64) -> StatThreshold {
    // Ties round to even, matching the product's historical numbers
    // (e.g. max 150 gives a cap of 112, not 113).
    let upper = (below_avg * UPPER_FACTOR).round_ties_even() as i64;
    let cap = (level_max as f64 * CAP_FACTOR).round_ties_even() as i64;
    StatThreshold {
        upper,
        cap,
        recommended: upper.min(cap),
    }
}

/// Compute balance thresholds per level: for each level `L` with a
/// populated level `L-1`, the recommended per-stat ceiling is the smaller
/// of `avg(L-1) * 1.15` and `max(L) * 0.75`, both rounded. Levels without
/// an `L-1` cohort get `stats: None`.
pub fn level_balance(
    store: &SnapshotStore,
    target: &SnapshotId,
) -> Result<BTreeMap<u32, LevelBalance>, QueryError> {
    let current = store.load(target)?;

    let mut by_level: BTreeMap<u32, StatAccumulator> = BTreeMap::new();
    for hero in current.values() {
        if let Some(level) = hero.level {
            by_level.entry(level).or_insert_with(StatAccumulator::new).add(hero);
        }
    }

    let mut out = BTreeMap::new();
    for (&level, acc) in &by_level {
        let below = level.checked_sub(1).and_then(|l| by_level.get(&l));

        let stats = below.map(|below_acc| {
            let t = |i: usize| threshold(below_acc.avg(i), acc.maxes[i]);
            BalanceStats {
                strength: t(0),
                defense: t(1),
                dexterity: t(2),
                mastery: t(3),
                vitality: t(4),
            }
        });

        out.insert(
            level,
            LevelBalance {
                level,
                count: acc.count,
                eligible: acc.count >= ELIGIBLE_MIN_COUNT,
                stats,
            },
        );
    }

    Ok(out)
}

/// Heroes at one level, ordered by base stats (strength first) descending,
/// then pid. Paged for the level drill-down view.
pub fn level_players(
    store: &SnapshotStore,
    target: &SnapshotId,
    level: u32,
    offset: usize,
    limit: usize,
) -> Result<Vec<Hero>, QueryError> {
    let current: SnapshotData = store.load(target)?;

    let mut heroes: Vec<Hero> = current
        .into_values()
        .filter(|h| h.level == Some(level))
        .collect();

    heroes.sort_by(|a, b| {
        b.strength
            .cmp(&a.strength)
            .then(b.defense.cmp(&a.defense))
            .then(b.dexterity.cmp(&a.dexterity))
            .then(b.mastery.cmp(&a.mastery))
            .then(b.vitality.cmp(&a.vitality))
            .then(a.pid.cmp(&b.pid))
    });

    Ok(heroes.into_iter().skip(offset).take(limit).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageConfig;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SnapshotStore) {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(StorageConfig::new(tmp.path().to_path_buf()));
        (tmp, store)
    }

    fn leveled(pid: u64, level: Option<u32>) -> Hero {
        let mut h = Hero::empty(pid);
        h.level = level;
        h
    }

    fn write(store: &SnapshotStore, id: &SnapshotId, heroes: Vec<Hero>) {
        let data: SnapshotData = heroes.into_iter().map(|h| (h.pid, h)).collect();
        store.write(id, &data).unwrap();
    }

    #[test]
    fn test_counts_and_totals() {
        let (_tmp, store) = setup();
        let older = SnapshotId::new("heroes_2026-01-01_00-00-00");
        let newer = SnapshotId::new("heroes_2026-01-02_00-00-00");
        write(
            &store,
            &older,
            vec![leveled(1, Some(5)), leveled(2, Some(5)), leveled(3, Some(6))],
        );
        write(
            &store,
            &newer,
            vec![
                leveled(1, Some(5)),
                leveled(2, Some(6)),
                leveled(3, Some(6)),
                leveled(4, Some(6)),
                leveled(5, None),
            ],
        );

        let (cohorts, totals) = level_counts(&store, &newer, Some(&older)).unwrap();

        // Sorted by level descending; the level-less hero is not counted.
        assert_eq!(cohorts.len(), 2);
        assert_eq!(cohorts[0].level, 6);
        assert_eq!(cohorts[0].count, 3);
        assert_eq!(cohorts[0].count_delta, 2);
        assert_eq!(cohorts[1].level, 5);
        assert_eq!(cohorts[1].count_delta, -1);

        assert_eq!(totals.count, 4);
        assert_eq!(totals.prev_count, 3);
        assert_eq!(totals.delta, 1);
    }

    #[test]
    fn test_counts_without_reference() {
        let (_tmp, store) = setup();
        let id = SnapshotId::new("heroes_2026-01-01_00-00-00");
        write(&store, &id, vec![leveled(1, Some(5))]);

        let (cohorts, totals) = level_counts(&store, &id, None).unwrap();
        assert_eq!(cohorts[0].count_delta, 1);
        assert_eq!(totals.prev_count, 0);
    }

    fn stat_hero(pid: u64, level: u32, stat: i64) -> Hero {
        let mut h = Hero::empty(pid);
        h.level = Some(level);
        h.strength = stat;
        h.defense = stat;
        h.dexterity = stat;
        h.mastery = stat;
        h.vitality = stat;
        h
    }

    #[test]
    fn test_balance_threshold_fixture() {
        // avg at L-1 = 100, max at L = 150:
        // upper = round(115) = 115, cap = round(112.5) = 112 (ties to even).
        let (_tmp, store) = setup();
        let id = SnapshotId::new("heroes_2026-01-01_00-00-00");
        write(
            &store,
            &id,
            vec![stat_hero(1, 4, 100), stat_hero(2, 5, 150)],
        );

        let balance = level_balance(&store, &id).unwrap();
        let stats = balance[&5].stats.unwrap();
        assert_eq!(stats.strength.upper, 115);
        assert_eq!(stats.strength.cap, 112);
        assert_eq!(stats.strength.recommended, 112);
    }

    #[test]
    fn test_balance_takes_smaller_threshold() {
        // avg below = 40 -> upper 46; max here = 200 -> cap 150.
        let (_tmp, store) = setup();
        let id = SnapshotId::new("heroes_2026-01-01_00-00-00");
        write(
            &store,
            &id,
            vec![stat_hero(1, 9, 40), stat_hero(2, 10, 200)],
        );

        let balance = level_balance(&store, &id).unwrap();
        let stats = balance[&10].stats.unwrap();
        assert_eq!(stats.defense.upper, 46);
        assert_eq!(stats.defense.cap, 150);
        assert_eq!(stats.defense.recommended, 46);
    }

    #[test]
    fn test_balance_without_level_below() {
        let (_tmp, store) = setup();
        let id = SnapshotId::new("heroes_2026-01-01_00-00-00");
        write(&store, &id, vec![stat_hero(1, 3, 50), stat_hero(2, 5, 80)]);

        let balance = level_balance(&store, &id).unwrap();
        // Level 3 has no level-2 cohort, level 5 has no level-4 cohort.
        assert!(balance[&3].stats.is_none());
        assert!(balance[&5].stats.is_none());
    }

    #[test]
    fn test_balance_eligibility_reflects_population() {
        let (_tmp, store) = setup();
        let id = SnapshotId::new("heroes_2026-01-01_00-00-00");

        let mut heroes: Vec<Hero> = (0..ELIGIBLE_MIN_COUNT as u64)
            .map(|i| stat_hero(100 + i, 7, 10))
            .collect();
        heroes.push(stat_hero(1, 6, 10));
        write(&store, &id, heroes);

        let balance = level_balance(&store, &id).unwrap();
        assert!(balance[&7].eligible);
        // Small cohorts still get their thresholds computed.
        assert!(!balance[&6].eligible);
        assert!(balance[&7].stats.is_some());
    }

    #[test]
    fn test_level_players_ordering_and_paging() {
        let (_tmp, store) = setup();
        let id = SnapshotId::new("heroes_2026-01-01_00-00-00");

        let mut a = stat_hero(1, 5, 10);
        a.strength = 50;
        let b = stat_hero(2, 5, 10);
        let mut c = stat_hero(3, 5, 10);
        c.strength = 30;
        let other_level = stat_hero(4, 6, 99);
        write(&store, &id, vec![a, b, c, other_level]);

        let page = level_players(&store, &id, 5, 0, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].pid, 1);
        assert_eq!(page[1].pid, 3);

        let rest = level_players(&store, &id, 5, 2, 2).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].pid, 2);
    }
}
