//! Level cohort models.

use serde::{Deserialize, Serialize};

/// Population of one level cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCount {
    pub level: u32,
    pub count: u32,

    /// Change vs. the same level in the reference snapshot.
    pub count_delta: i64,
}

/// Grand totals across all level cohorts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTotals {
    pub count: u32,
    pub prev_count: u32,
    pub delta: i64,
}

/// Recommended ceiling for one base stat at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatThreshold {
    /// `round(avg at level below * 1.15)` — don't trivially outgrow the
    /// tier below.
    pub upper: i64,

    /// `round(max at this level * 0.75)` — don't recommend past what anyone
    /// at the level has reached.
    pub cap: i64,

    /// The smaller of the two.
    pub recommended: i64,
}

/// Thresholds for each of the five base stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceStats {
    pub strength: StatThreshold,
    pub defense: StatThreshold,
    pub dexterity: StatThreshold,
    pub mastery: StatThreshold,
    pub vitality: StatThreshold,
}

/// Balance summary for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBalance {
    pub level: u32,
    pub count: u32,

    /// Whether the cohort is large enough (>= 20) for the UI to show the
    /// numbers. Computation never depends on this.
    pub eligible: bool,

    /// `None` when the level below has no data to derive thresholds from.
    pub stats: Option<BalanceStats>,
}
