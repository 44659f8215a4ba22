//! Growth rating builder: metric differences between two explicit snapshots.

use crate::models::{GrowthRow, SnapshotId};
use crate::params::{value_of, FightCounter, Param, Resolved, ValueSpec};
use crate::storage::SnapshotStore;

use super::QueryError;

/// Rank every hero in `to` by the metric's change since `from`.
///
/// A hero absent from `from` counts as starting at 0. For the looted/lost
/// currency metrics the row also carries the average change per fight in
/// the same range (`None` when no fights happened). `from == to` yields
/// all-zero diffs, which is fine.
pub fn growth_between(
    store: &SnapshotStore,
    from: &SnapshotId,
    to: &SnapshotId,
    param: Param,
    level: Option<u32>,
    cap: usize,
) -> Result<Vec<GrowthRow>, QueryError> {
    let spec = match param.resolve() {
        Resolved::Value(spec) => spec,
        // Mode compatibility is enforced upstream; a non-diffable metric
        // reaching this builder falls back to glory.
        _ => match Param::Glory.resolve() {
            Resolved::Value(spec) => spec,
            _ => unreachable!("glory is a value metric"),
        },
    };

    let older = store.load(from)?;
    let newer = store.load(to)?;
    let fight_counter = param.fight_counter();

    let mut rows: Vec<GrowthRow> = newer
        .values()
        .filter(|h| level.is_none() || h.level == level)
        .map(|hero| {
            let prev = older.get(&hero.pid);
            let prev_value = prev.map(|p| value_of(p, &spec)).unwrap_or(0);
            let diff = value_of(hero, &spec) - prev_value;

            let per_fight = fight_counter.and_then(|counter| {
                let (now, before) = match counter {
                    FightCounter::Wins => (hero.wins, prev.map(|p| p.wins).unwrap_or(0)),
                    FightCounter::Losses => (hero.losses, prev.map(|p| p.losses).unwrap_or(0)),
                };
                let fights = now - before;
                if fights > 0 {
                    Some((diff as f64 / fights as f64).round() as i64)
                } else {
                    None
                }
            });

            GrowthRow {
                pid: hero.pid,
                name: hero.name.clone(),
                level: hero.level,
                diff,
                per_fight,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.diff.cmp(&a.diff).then(a.pid.cmp(&b.pid)));
    rows.truncate(cap);
    Ok(rows)
}
