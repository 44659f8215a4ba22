//! Point-in-time rating builder.

use crate::models::{RatingRow, SnapshotId};
use crate::params::{value_of, ValueSpec};
use crate::storage::SnapshotStore;

use super::QueryError;

/// Rank every hero in `target` by the metric, annotated with the change
/// vs. `reference` when one is given.
///
/// Heroes absent from the reference get `delta: None`, never `Some(0)`.
/// Output is sorted by value descending (pid ascending on ties) and capped
/// at `cap` rows.
pub fn overall_rating(
    store: &SnapshotStore,
    target: &SnapshotId,
    reference: Option<&SnapshotId>,
    spec: &ValueSpec,
    level: Option<u32>,
    cap: usize,
) -> Result<Vec<RatingRow>, QueryError> {
    let current = store.load(target)?;
    let previous = match reference {
        Some(id) => Some(store.load(id)?),
        None => None,
    };

    let mut rows: Vec<RatingRow> = current
        .values()
        .filter(|h| level.is_none() || h.level == level)
        .map(|hero| {
            let value = value_of(hero, spec);
            let delta = previous.as_ref().and_then(|prev| {
                prev.get(&hero.pid).map(|p| value - value_of(p, spec))
            });
            RatingRow {
                pid: hero.pid,
                name: hero.name.clone(),
                level: hero.level,
                value,
                delta,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.value.cmp(&a.value).then(a.pid.cmp(&b.pid)));
    rows.truncate(cap);
    Ok(rows)
}
