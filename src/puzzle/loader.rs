use std::path::{Path, PathBuf};

use log::{debug, info};

use super::types::{ActivityDef, KindDef, RoomDef, RuleDef};
use crate::error::{EscapeError, Result};

pub fn load_room(path: &Path) -> Result<RoomDef> {
    let content = std::fs::read_to_string(path).map_err(|source| EscapeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let room: RoomDef = toml::from_str(&content).map_err(|source| EscapeError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&room)?;
    debug!("loaded room {} from {}", room.meta.id, path.display());
    Ok(room)
}

/// Loads every `room_*.toml` of a path directory, ordered by file name so
/// `room_01` comes before `room_02`.
pub fn load_path_dir(dir: &Path) -> Result<Vec<RoomDef>> {
    if !dir.is_dir() {
        return Err(EscapeError::NoContent(dir.to_path_buf()));
    }
    let pattern = dir.join("room_*.toml");
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();

    let rooms = files
        .iter()
        .map(|file| load_room(file))
        .collect::<Result<Vec<_>>>()?;
    if rooms.is_empty() {
        return Err(EscapeError::EmptyPath(dir.display().to_string()));
    }
    info!("loaded {} rooms from {}", rooms.len(), dir.display());
    Ok(rooms)
}

fn validate(room: &RoomDef) -> Result<()> {
    let id = room.meta.id.as_str();
    let activity = &room.activity;
    match activity.kind {
        KindDef::Quiz => {
            if activity.questions.is_empty() {
                return Err(EscapeError::invalid(id, "quiz has no questions"));
            }
            for (n, q) in activity.questions.iter().enumerate() {
                if q.answer >= q.options.len() {
                    return Err(EscapeError::invalid(
                        id,
                        format!("question {} answer {} out of range", n + 1, q.answer),
                    ));
                }
            }
        }
        KindDef::Matching | KindDef::Board => {
            if activity.items.is_empty() || activity.slots.is_empty() {
                return Err(EscapeError::invalid(id, "placement activity needs items and slots"));
            }
            for item in &activity.items {
                if item.targets.is_empty() {
                    return Err(EscapeError::invalid(id, format!("item '{}' has no target", item.id)));
                }
                if let Some(bad) = item
                    .targets
                    .iter()
                    .find(|t| !activity.slots.iter().any(|s| &s.id == *t))
                {
                    return Err(EscapeError::invalid(
                        id,
                        format!("item '{}' targets unknown slot '{}'", item.id, bad),
                    ));
                }
            }
            check_slot_room(id, activity)?;
        }
        KindDef::Ordering => {
            if activity.items.is_empty() {
                return Err(EscapeError::invalid(id, "ordering has no items"));
            }
            let mut ranks: Vec<usize> = Vec::new();
            for item in &activity.items {
                match item.rank {
                    Some(r) if r >= 1 && r <= activity.items.len() => ranks.push(r),
                    _ => {
                        return Err(EscapeError::invalid(
                            id,
                            format!("item '{}' needs a rank between 1 and {}", item.id, activity.items.len()),
                        ))
                    }
                }
            }
            ranks.sort_unstable();
            ranks.dedup();
            if ranks.len() != activity.items.len() {
                return Err(EscapeError::invalid(id, "ordering ranks must be distinct"));
            }
        }
    }
    Ok(())
}

/// A full match needs every item in its one target, so no slot may be
/// targeted by more items than it holds.
fn check_slot_room(id: &str, activity: &ActivityDef) -> Result<()> {
    let default_rule = match activity.kind {
        KindDef::Board => RuleDef::Membership,
        _ => RuleDef::FullMatch,
    };
    if activity.rule.unwrap_or(default_rule) != RuleDef::FullMatch {
        return Ok(());
    }
    let capacity = match activity.kind {
        KindDef::Matching => activity.slot_capacity.or(Some(1)),
        _ => activity.slot_capacity,
    };
    let Some(capacity) = capacity else {
        return Ok(());
    };
    for slot in &activity.slots {
        let wanted = activity
            .items
            .iter()
            .filter(|item| item.targets.first() == Some(&slot.id))
            .count();
        if wanted > capacity {
            return Err(EscapeError::invalid(
                id,
                format!(
                    "slot '{}' holds {} but {} items must go there",
                    slot.id, capacity, wanted
                ),
            ));
        }
    }
    Ok(())
}
