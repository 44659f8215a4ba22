//! Hero (player) rows as captured in one snapshot.

use serde::{Deserialize, Serialize};

/// A single numeric attribute of a hero.
///
/// Every metric a rating can be built from resolves to one of these,
/// or to the derived stat sum (which is never stored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Glory,
    Wins,
    Losses,
    DragonWins,
    SerpentWins,
    BeastsKilled,
    Strength,
    Defense,
    Dexterity,
    Mastery,
    Vitality,
    LootedSilver,
    LostSilver,
    LootedCrystals,
    LostCrystals,
}

/// The five base stats, in display order.
pub const BASE_STATS: [Attribute; 5] = [
    Attribute::Strength,
    Attribute::Defense,
    Attribute::Dexterity,
    Attribute::Mastery,
    Attribute::Vitality,
];

/// One hero as captured in one snapshot.
///
/// Numeric fields default to 0 on deserialization: attributes were added
/// to the game over time, so older snapshots lack some of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub pid: u64,

    #[serde(default)]
    pub name: String,

    /// Absent for heroes whose profile page hid the level.
    #[serde(default)]
    pub level: Option<u32>,

    #[serde(default)]
    pub glory: i64,
    #[serde(default)]
    pub wins: i64,
    #[serde(default)]
    pub losses: i64,
    #[serde(default)]
    pub dragon_wins: i64,
    #[serde(default)]
    pub serpent_wins: i64,
    #[serde(default)]
    pub beasts_killed: i64,

    #[serde(default)]
    pub strength: i64,
    #[serde(default)]
    pub defense: i64,
    #[serde(default)]
    pub dexterity: i64,
    #[serde(default)]
    pub mastery: i64,
    #[serde(default)]
    pub vitality: i64,

    #[serde(default)]
    pub looted_silver: i64,
    #[serde(default)]
    pub lost_silver: i64,
    #[serde(default)]
    pub looted_crystals: i64,
    #[serde(default)]
    pub lost_crystals: i64,

    /// Clan display name as scraped, including the "not a member" sentinel.
    #[serde(default)]
    pub clan: Option<String>,

    /// Stable clan id; absent in snapshots captured before ids existed.
    #[serde(default)]
    pub clan_id: Option<u64>,

    #[serde(default)]
    pub brotherhood: Option<String>,

    #[serde(default)]
    pub brotherhood_id: Option<u64>,
}

impl Hero {
    /// A hero with the given pid and every other field empty or zero.
    pub fn empty(pid: u64) -> Self {
        Self {
            pid,
            name: String::new(),
            level: None,
            glory: 0,
            wins: 0,
            losses: 0,
            dragon_wins: 0,
            serpent_wins: 0,
            beasts_killed: 0,
            strength: 0,
            defense: 0,
            dexterity: 0,
            mastery: 0,
            vitality: 0,
            looted_silver: 0,
            lost_silver: 0,
            looted_crystals: 0,
            lost_crystals: 0,
            clan: None,
            clan_id: None,
            brotherhood: None,
            brotherhood_id: None,
        }
    }

    /// Read a single stored attribute.
    pub fn attr(&self, attribute: Attribute) -> i64 {
        match attribute {
            Attribute::Glory => self.glory,
            Attribute::Wins => self.wins,
            Attribute::Losses => self.losses,
            Attribute::DragonWins => self.dragon_wins,
            Attribute::SerpentWins => self.serpent_wins,
            Attribute::BeastsKilled => self.beasts_killed,
            Attribute::Strength => self.strength,
            Attribute::Defense => self.defense,
            Attribute::Dexterity => self.dexterity,
            Attribute::Mastery => self.mastery,
            Attribute::Vitality => self.vitality,
            Attribute::LootedSilver => self.looted_silver,
            Attribute::LostSilver => self.lost_silver,
            Attribute::LootedCrystals => self.looted_crystals,
            Attribute::LostCrystals => self.lost_crystals,
        }
    }

    /// Sum of the five base stats. Derived, never stored.
    pub fn stat_sum(&self) -> i64 {
        BASE_STATS.iter().map(|s| self.attr(*s)).sum()
    }
}
