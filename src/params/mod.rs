//! Metric parameter resolution.
//!
//! Maps the closed set of selectable metric names onto value-extraction
//! rules. Every builder evaluates heroes through [`value_of`] so that a
//! metric being a single attribute or a sum of attributes is invisible to
//! the rest of the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Attribute, GroupKind, Hero, BASE_STATS};

/// Errors from parameter resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
}

/// Request mode a metric is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Overall,
    Growth,
    BestWindow,
}

/// The closed set of selectable metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    Glory,
    Wins,
    Losses,
    DragonWins,
    SerpentWins,
    BeastsKilled,
    ByLevel,
    Strength,
    Defense,
    Dexterity,
    Mastery,
    Vitality,
    StatSum,
    LootedSilver,
    LostSilver,
    LootedCrystals,
    LostCrystals,
    BrotherhoodsByGlory,
    BrotherhoodsByStats,
    ClansByGlory,
    ClansByStats,
}

/// All selectable metrics, in display order.
pub const ALL_PARAMS: [Param; 21] = [
    Param::Glory,
    Param::Wins,
    Param::Losses,
    Param::DragonWins,
    Param::SerpentWins,
    Param::BeastsKilled,
    Param::ByLevel,
    Param::Strength,
    Param::Defense,
    Param::Dexterity,
    Param::Mastery,
    Param::Vitality,
    Param::StatSum,
    Param::LootedSilver,
    Param::LostSilver,
    Param::LootedCrystals,
    Param::LostCrystals,
    Param::BrotherhoodsByGlory,
    Param::BrotherhoodsByStats,
    Param::ClansByGlory,
    Param::ClansByStats,
];

/// How a metric's value is extracted from a hero row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSpec {
    Single(Attribute),
    /// Sum of the five base stats.
    StatSum,
}

/// What a parameter resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A per-hero numeric metric.
    Value(ValueSpec),

    /// A group ranking: which kind of group, scored by which metric.
    Group { kind: GroupKind, scoring: ValueSpec },

    /// The level-cohort view.
    ByLevel,
}

/// Which fight counter normalizes a currency diff into a per-fight average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightCounter {
    Wins,
    Losses,
}

impl Param {
    /// Resolve the metric into its extraction rule.
    pub fn resolve(&self) -> Resolved {
        match self {
            Param::Glory => Resolved::Value(ValueSpec::Single(Attribute::Glory)),
            Param::Wins => Resolved::Value(ValueSpec::Single(Attribute::Wins)),
            Param::Losses => Resolved::Value(ValueSpec::Single(Attribute::Losses)),
            Param::DragonWins => Resolved::Value(ValueSpec::Single(Attribute::DragonWins)),
            Param::SerpentWins => Resolved::Value(ValueSpec::Single(Attribute::SerpentWins)),
            Param::BeastsKilled => Resolved::Value(ValueSpec::Single(Attribute::BeastsKilled)),
            Param::ByLevel => Resolved::ByLevel,
            Param::Strength => Resolved::Value(ValueSpec::Single(Attribute::Strength)),
            Param::Defense => Resolved::Value(ValueSpec::Single(Attribute::Defense)),
            Param::Dexterity => Resolved::Value(ValueSpec::Single(Attribute::Dexterity)),
            Param::Mastery => Resolved::Value(ValueSpec::Single(Attribute::Mastery)),
            Param::Vitality => Resolved::Value(ValueSpec::Single(Attribute::Vitality)),
            Param::StatSum => Resolved::Value(ValueSpec::StatSum),
            Param::LootedSilver => Resolved::Value(ValueSpec::Single(Attribute::LootedSilver)),
            Param::LostSilver => Resolved::Value(ValueSpec::Single(Attribute::LostSilver)),
            Param::LootedCrystals => Resolved::Value(ValueSpec::Single(Attribute::LootedCrystals)),
            Param::LostCrystals => Resolved::Value(ValueSpec::Single(Attribute::LostCrystals)),
            Param::BrotherhoodsByGlory => Resolved::Group {
                kind: GroupKind::Brotherhood,
                scoring: ValueSpec::Single(Attribute::Glory),
            },
            Param::BrotherhoodsByStats => Resolved::Group {
                kind: GroupKind::Brotherhood,
                scoring: ValueSpec::StatSum,
            },
            Param::ClansByGlory => Resolved::Group {
                kind: GroupKind::Clan,
                scoring: ValueSpec::Single(Attribute::Glory),
            },
            Param::ClansByStats => Resolved::Group {
                kind: GroupKind::Clan,
                scoring: ValueSpec::StatSum,
            },
        }
    }

    /// Whether the metric can be diffed between snapshots.
    /// Group rankings and the level view cannot.
    pub fn is_growth_eligible(&self) -> bool {
        matches!(self.resolve(), Resolved::Value(_))
    }

    /// The 16 diffable metrics, in display order. This is the metric set
    /// the best-window cache maintains.
    pub fn growth_eligible() -> Vec<Param> {
        ALL_PARAMS
            .iter()
            .copied()
            .filter(Param::is_growth_eligible)
            .collect()
    }

    /// Fight counter for per-fight averages: wins for looted currency,
    /// losses for lost currency, nothing for everything else.
    pub fn fight_counter(&self) -> Option<FightCounter> {
        match self {
            Param::LootedSilver | Param::LootedCrystals => Some(FightCounter::Wins),
            Param::LostSilver | Param::LostCrystals => Some(FightCounter::Losses),
            _ => None,
        }
    }

    /// Metrics offered for selection in the given mode.
    pub fn selectable(mode: Mode) -> Vec<Param> {
        match mode {
            Mode::Overall => ALL_PARAMS.to_vec(),
            Mode::Growth | Mode::BestWindow => Param::growth_eligible(),
        }
    }

    /// The metric actually used for a request in the given mode.
    ///
    /// Stale form state can submit a metric that is not selectable in the
    /// mode (e.g. a clan ranking in growth mode); substitute glory instead
    /// of failing so the UI stays usable.
    pub fn effective(mode: Mode, param: Param) -> Param {
        if Param::selectable(mode).contains(&param) {
            param
        } else {
            Param::Glory
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Param::Glory => "glory",
            Param::Wins => "wins",
            Param::Losses => "losses",
            Param::DragonWins => "dragon_wins",
            Param::SerpentWins => "serpent_wins",
            Param::BeastsKilled => "beasts_killed",
            Param::ByLevel => "by_level",
            Param::Strength => "strength",
            Param::Defense => "defense",
            Param::Dexterity => "dexterity",
            Param::Mastery => "mastery",
            Param::Vitality => "vitality",
            Param::StatSum => "stat_sum",
            Param::LootedSilver => "looted_silver",
            Param::LostSilver => "lost_silver",
            Param::LootedCrystals => "looted_crystals",
            Param::LostCrystals => "lost_crystals",
            Param::BrotherhoodsByGlory => "brotherhoods_by_glory",
            Param::BrotherhoodsByStats => "brotherhoods_by_stats",
            Param::ClansByGlory => "clans_by_glory",
            Param::ClansByStats => "clans_by_stats",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Param {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PARAMS
            .iter()
            .copied()
            .find(|p| p.to_string() == s)
            .ok_or_else(|| ParamError::UnknownParameter(s.to_string()))
    }
}

/// Evaluate a metric for one hero. The single entry point every builder
/// uses; missing attributes were already defaulted to 0 at ingestion.
pub fn value_of(hero: &Hero, spec: &ValueSpec) -> i64 {
    match spec {
        ValueSpec::Single(attribute) => hero.attr(*attribute),
        ValueSpec::StatSum => BASE_STATS.iter().map(|s| hero.attr(*s)).sum(),
    }
}
