//! Raw snapshot ingestion.
//!
//! The scraper produces JSON attribute bags: a map of pid strings to
//! loosely-typed hero objects whose keys changed over the product's life
//! (the capture originally used Russian labels, later English ones).
//! Alias resolution happens here and only here; everything past this
//! module operates on the normalized [`Hero`] struct.

use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Hero, SnapshotId, SnapshotMeta};
use crate::storage::{SnapshotData, SnapshotStore, StorageError};

/// Errors during raw snapshot ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("raw file name carries no snapshot timestamp: {0}")]
    BadFileName(String),

    #[error("raw snapshot is not a JSON object")]
    NotAnObject,
}

const NAME_KEYS: &[&str] = &["Имя", "имя", "name", "nick", "Ник"];
const LEVEL_KEYS: &[&str] = &["Уровень", "уровень", "level"];
const GLORY_KEYS: &[&str] = &["Слава", "glory"];
const WINS_KEYS: &[&str] = &["Побед", "wins"];
const LOSSES_KEYS: &[&str] = &["Поражений", "losses"];
const DRAGON_WINS_KEYS: &[&str] = &["Побед над Драконом", "dragon_wins"];
const SERPENT_WINS_KEYS: &[&str] = &["Побед над Змеем", "serpent_wins", "snake_wins"];
const BEASTS_KILLED_KEYS: &[&str] = &["Убито зверей", "beasts_killed"];
const STRENGTH_KEYS: &[&str] = &["Сила", "strength"];
const DEFENSE_KEYS: &[&str] = &["Защита", "defense"];
const DEXTERITY_KEYS: &[&str] = &["Ловкость", "dexterity"];
const MASTERY_KEYS: &[&str] = &["Мастерство", "mastery"];
const VITALITY_KEYS: &[&str] = &["Живучесть", "vitality"];
const LOOTED_SILVER_KEYS: &[&str] = &["Награбил (серебро)", "looted_silver", "rob_silver"];
const LOST_SILVER_KEYS: &[&str] = &["Потерял (серебро)", "lost_silver"];
const LOOTED_CRYSTALS_KEYS: &[&str] = &["Награбил (кристаллы)", "looted_crystals", "rob_crystals"];
const LOST_CRYSTALS_KEYS: &[&str] = &["Потерял (кристаллы)", "lost_crystals"];
const CLAN_KEYS: &[&str] = &["Клан", "clan"];
const CLAN_ID_KEYS: &[&str] = &["clan_id", "Клан_id", "клан_id"];
const BROTHERHOOD_KEYS: &[&str] = &["Братство", "brotherhood"];
const BROTHERHOOD_ID_KEYS: &[&str] = &["brotherhood_id", "Братство_id", "братство_id"];

/// First alias that carries an integer (or numeric string), else 0.
fn pick_int(bag: &Map<String, Value>, keys: &[&str]) -> i64 {
    for key in keys {
        match bag.get(*key) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_i64() {
                    return v;
                }
            }
            Some(Value::String(s)) => {
                if let Ok(v) = s.trim().parse::<i64>() {
                    return v;
                }
            }
            _ => {}
        }
    }
    0
}

/// First alias that carries a non-empty string, else `None`.
fn pick_str(bag: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(Value::String(s)) = bag.get(*key) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn pick_id(bag: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    for key in keys {
        match bag.get(*key) {
            Some(Value::Number(n)) => return n.as_u64(),
            Some(Value::String(s)) => {
                if let Ok(v) = s.trim().parse::<u64>() {
                    return Some(v);
                }
            }
            _ => {}
        }
    }
    None
}

/// Normalize one raw attribute bag into a hero row.
pub fn normalize_hero(pid: u64, bag: &Map<String, Value>) -> Hero {
    let mut hero = Hero::empty(pid);
    hero.name = pick_str(bag, NAME_KEYS).unwrap_or_default();
    hero.level = pick_id(bag, LEVEL_KEYS).map(|l| l as u32);
    hero.glory = pick_int(bag, GLORY_KEYS);
    hero.wins = pick_int(bag, WINS_KEYS);
    hero.losses = pick_int(bag, LOSSES_KEYS);
    hero.dragon_wins = pick_int(bag, DRAGON_WINS_KEYS);
    hero.serpent_wins = pick_int(bag, SERPENT_WINS_KEYS);
    hero.beasts_killed = pick_int(bag, BEASTS_KILLED_KEYS);
    hero.strength = pick_int(bag, STRENGTH_KEYS);
    hero.defense = pick_int(bag, DEFENSE_KEYS);
    hero.dexterity = pick_int(bag, DEXTERITY_KEYS);
    hero.mastery = pick_int(bag, MASTERY_KEYS);
    hero.vitality = pick_int(bag, VITALITY_KEYS);
    hero.looted_silver = pick_int(bag, LOOTED_SILVER_KEYS);
    hero.lost_silver = pick_int(bag, LOST_SILVER_KEYS);
    hero.looted_crystals = pick_int(bag, LOOTED_CRYSTALS_KEYS);
    hero.lost_crystals = pick_int(bag, LOST_CRYSTALS_KEYS);
    hero.clan = pick_str(bag, CLAN_KEYS);
    hero.clan_id = pick_id(bag, CLAN_ID_KEYS);
    hero.brotherhood = pick_str(bag, BROTHERHOOD_KEYS);
    hero.brotherhood_id = pick_id(bag, BROTHERHOOD_ID_KEYS);
    hero
}

/// Parse a full raw snapshot document into normalized hero rows.
/// Keys that are not numeric pids are skipped with a warning.
pub fn normalize_snapshot(raw: &Value) -> Result<SnapshotData, IngestError> {
    let object = raw.as_object().ok_or(IngestError::NotAnObject)?;

    let mut data = SnapshotData::new();
    for (key, value) in object {
        let Ok(pid) = key.trim().parse::<u64>() else {
            warn!("Skipping non-numeric pid key {:?}", key);
            continue;
        };
        let Some(bag) = value.as_object() else {
            warn!("Skipping pid {}: row is not an object", pid);
            continue;
        };
        data.insert(pid, normalize_hero(pid, bag));
    }

    Ok(data)
}

/// Result of ingesting one raw file.
#[derive(Debug)]
pub struct IngestResult {
    pub snapshot: SnapshotMeta,
    pub heroes: usize,
}

/// Ingest one raw snapshot file into the store.
///
/// The snapshot id (and so its place in history) comes from the filename.
pub fn ingest_file(store: &SnapshotStore, path: &Path) -> Result<IngestResult, IngestError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestError::BadFileName(path.display().to_string()))?;

    let id = SnapshotId::new(stem);
    let meta = SnapshotMeta::from_id(id)
        .map_err(|e| IngestError::BadFileName(e.0))?;

    let contents = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&contents)?;
    let data = normalize_snapshot(&raw)?;

    store.write(&meta.id, &data)?;
    info!("Ingested {} ({} heroes)", meta.id, data.len());

    Ok(IngestResult {
        heroes: data.len(),
        snapshot: meta,
    })
}
