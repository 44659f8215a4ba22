//! Clan/brotherhood standings with cross-snapshot reconciliation.
//!
//! Grouping keys are stable group ids when the snapshot carries them, and
//! trimmed display names otherwise. The history straddles the game's
//! introduction of stable ids, so the key mode is decided per snapshot by
//! inspecting its rows, never globally.

use std::collections::HashMap;

use crate::models::{
    GroupKey, GroupKind, GroupMember, GroupStanding, Hero, SnapshotId, NO_GROUP_SENTINEL,
};
use crate::params::{value_of, ValueSpec};
use crate::storage::{SnapshotData, SnapshotStore};

use super::QueryError;

/// How one snapshot's rows are keyed into groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupingMode {
    ById,
    ByName,
}

/// A non-sentinel, non-empty group name means actual membership.
fn is_member_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && trimmed.to_lowercase() != NO_GROUP_SENTINEL.to_lowercase()
}

/// Id-mode when any row carries a stable id for this kind, else name-mode.
fn decide_mode(data: &SnapshotData, kind: GroupKind) -> GroupingMode {
    if data.values().any(|h| kind.id_of(h).is_some()) {
        GroupingMode::ById
    } else {
        GroupingMode::ByName
    }
}

/// Grouping key of one hero under the snapshot's mode, `None` when the
/// hero is not a member (or lacks the data the mode needs).
fn key_for(hero: &Hero, kind: GroupKind, mode: GroupingMode) -> Option<GroupKey> {
    match mode {
        GroupingMode::ById => {
            let id = kind.id_of(hero)?;
            // Rows with an id but no display name are dropped outright.
            let name = kind.name_of(hero)?;
            if name.trim().is_empty() {
                return None;
            }
            Some(GroupKey::Id(id))
        }
        GroupingMode::ByName => {
            let name = kind.name_of(hero)?;
            if !is_member_name(name) {
                return None;
            }
            Some(GroupKey::Name(name.trim().to_string()))
        }
    }
}

struct ReferenceGroup {
    name: String,
    score: i64,
    count: u32,
}

struct TargetGroup {
    name: String,
    score: i64,
    members: Vec<GroupMember>,
}

/// Build group standings for `target`, reconciled against `reference`.
///
/// Groups that only exist in the reference (disbanded) still appear, with
/// a zero score and a fully negative delta. When the two snapshots use
/// different key modes (reference predates stable ids), their keyspaces
/// are not comparable: the reference side is treated as "no prior data",
/// so every target group's delta equals its full score. Per-member deltas
/// are resolved by pid and survive either way.
pub fn group_standings(
    store: &SnapshotStore,
    target: &SnapshotId,
    reference: Option<&SnapshotId>,
    kind: GroupKind,
    scoring: &ValueSpec,
    level: Option<u32>,
) -> Result<Vec<GroupStanding>, QueryError> {
    let current = store.load(target)?;
    let previous = match reference {
        Some(id) => Some(store.load(id)?),
        None => None,
    };

    let target_mode = decide_mode(&current, kind);

    let mut prev_groups: HashMap<GroupKey, ReferenceGroup> = HashMap::new();
    let mut prev_value_by_pid: HashMap<u64, i64> = HashMap::new();

    if let Some(prev) = &previous {
        let reference_mode = decide_mode(prev, kind);
        let comparable = reference_mode == target_mode;

        for hero in prev.values() {
            if level.is_some() && hero.level != level {
                continue;
            }
            let Some(key) = key_for(hero, kind, reference_mode) else {
                continue;
            };
            let value = value_of(hero, scoring);
            prev_value_by_pid.insert(hero.pid, value);

            if comparable {
                let name = kind.name_of(hero).unwrap_or_default().trim().to_string();
                let group = prev_groups.entry(key).or_insert(ReferenceGroup {
                    name,
                    score: 0,
                    count: 0,
                });
                group.score += value;
                group.count += 1;
            }
        }
    }

    let mut groups: HashMap<GroupKey, TargetGroup> = HashMap::new();
    for hero in current.values() {
        if level.is_some() && hero.level != level {
            continue;
        }
        let Some(key) = key_for(hero, kind, target_mode) else {
            continue;
        };
        let value = value_of(hero, scoring);
        let name = kind.name_of(hero).unwrap_or_default().trim().to_string();

        let group = groups.entry(key).or_insert(TargetGroup {
            name,
            score: 0,
            members: Vec::new(),
        });
        group.score += value;
        group.members.push(GroupMember {
            rank: 0,
            pid: hero.pid,
            name: hero.name.clone(),
            level: hero.level,
            value,
            delta: prev_value_by_pid.get(&hero.pid).map(|prev| value - prev),
        });
    }

    let mut keys: Vec<GroupKey> = groups.keys().cloned().collect();
    for key in prev_groups.keys() {
        if !groups.contains_key(key) {
            keys.push(key.clone());
        }
    }

    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let prev = prev_groups.get(&key);
        let prev_score = prev.map(|g| g.score).unwrap_or(0);
        let prev_count = prev.map(|g| g.count).unwrap_or(0);

        let (name, score, mut members) = match groups.remove(&key) {
            Some(group) => (group.name, group.score, group.members),
            // Disbanded: keep the reference's name, empty membership.
            None => (
                prev.map(|g| g.name.clone()).unwrap_or_default(),
                0,
                Vec::new(),
            ),
        };

        members.sort_by(|a, b| b.value.cmp(&a.value).then(a.pid.cmp(&b.pid)));
        for (i, member) in members.iter_mut().enumerate() {
            member.rank = (i + 1) as u32;
        }

        let display_name = if !name.is_empty() {
            name
        } else {
            key.display()
        };

        out.push(GroupStanding {
            name: display_name,
            score,
            delta: score - prev_score,
            count: members.len() as u32,
            count_delta: members.len() as i64 - prev_count as i64,
            members,
        });
    }

    out.sort_by(|a, b| b.score.cmp(&a.score).then(a.name.cmp(&b.name)));
    Ok(out)
}
