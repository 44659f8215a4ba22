//! Result rows produced by the rating builders.

use serde::{Deserialize, Serialize};

/// One row of a point-in-time rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRow {
    pub pid: u64,
    pub name: String,
    pub level: Option<u32>,

    /// Metric value in the target snapshot.
    pub value: i64,

    /// Change vs. the reference snapshot. `None` when the hero has no row
    /// in the reference; a genuine zero change is `Some(0)`.
    pub delta: Option<i64>,
}

/// One row of a growth rating between two explicit snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthRow {
    pub pid: u64,
    pub name: String,
    pub level: Option<u32>,

    /// `value(to) - value(from)`, with an absent `from` row counting as 0.
    pub diff: i64,

    /// Average gain/loss per fight, for the looted/lost currency metrics.
    /// `None` for other metrics and when no fights happened in the range.
    pub per_fight: Option<i64>,
}

/// One row of the best-window cache: the largest single-interval gain a
/// hero achieved inside the trailing window. Always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestGainRow {
    pub pid: u64,
    pub name: String,
    pub level: Option<u32>,
    pub gain: i64,
}
