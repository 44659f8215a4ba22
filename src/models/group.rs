//! Clan and brotherhood aggregation models.

use serde::{Deserialize, Serialize};

/// Display name the game uses for "not in a clan/brotherhood".
/// Compared case-insensitively when grouping by name.
pub const NO_GROUP_SENTINEL: &str = "Нет";

/// Which grouping a hero row is aggregated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Clan,
    Brotherhood,
}

impl GroupKind {
    /// Stable group id of the hero for this kind, with 0 meaning "no id".
    pub fn id_of(&self, hero: &crate::models::Hero) -> Option<u64> {
        let raw = match self {
            GroupKind::Clan => hero.clan_id,
            GroupKind::Brotherhood => hero.brotherhood_id,
        };
        raw.filter(|&id| id != 0)
    }

    /// Raw display name of the hero's group for this kind.
    pub fn name_of<'a>(&self, hero: &'a crate::models::Hero) -> Option<&'a str> {
        match self {
            GroupKind::Clan => hero.clan.as_deref(),
            GroupKind::Brotherhood => hero.brotherhood.as_deref(),
        }
    }
}

/// Grouping key. Snapshots captured before stable group ids existed can
/// only be grouped by display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Id(u64),
    Name(String),
}

impl GroupKey {
    /// Fallback display text when neither snapshot supplies a name.
    pub fn display(&self) -> String {
        match self {
            GroupKey::Id(id) => id.to_string(),
            GroupKey::Name(name) => name.clone(),
        }
    }
}

/// A member row inside a group standing, ranked within the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// 1-based rank within the group by value descending.
    pub rank: u32,
    pub pid: u64,
    pub name: String,
    pub level: Option<u32>,
    pub value: i64,

    /// Change vs. the same pid in the reference snapshot, `None` when absent.
    pub delta: Option<i64>,
}

/// One group's aggregated standing, reconciled against a reference snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStanding {
    pub name: String,

    /// Sum of member values in the target snapshot.
    pub score: i64,

    /// `score - reference score`, with a missing side counting as 0.
    pub delta: i64,

    pub count: u32,
    pub count_delta: i64,

    /// Empty for groups that only exist in the reference (disbanded).
    pub members: Vec<GroupMember>,
}
