// src/map/door.rs

use super::tile::TileKey;

/// How a door is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoorKind {
    /// Opened with a key.
    Locked,
    /// Opened by typing `code` at `prompt`.
    Keypad { code: i64, prompt: String },
}

/// A locked passage occupying one link slot of its source tile.
///
/// The door itself has no grid cell. `replacement` is the tile the passage
/// leads to once unlocked; `None` means the door is broken (its destination
/// was deleted) until the neighbouring cell is filled again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Door {
    pub tile_id: String,
    pub prefix: String,
    pub name: String,
    pub kind: DoorKind,
    pub replacement: Option<TileKey>,
}

impl Door {
    pub fn locked(tile_id: &str, prefix: &str, name: &str, replacement: Option<TileKey>) -> Self {
        Door {
            tile_id: tile_id.to_string(),
            prefix: prefix.to_string(),
            name: name.to_string(),
            kind: DoorKind::Locked,
            replacement,
        }
    }

    pub fn keypad(
        tile_id: &str,
        prefix: &str,
        name: &str,
        code: i64,
        prompt: &str,
        replacement: Option<TileKey>,
    ) -> Self {
        Door {
            tile_id: tile_id.to_string(),
            prefix: prefix.to_string(),
            name: name.to_string(),
            kind: DoorKind::Keypad {
                code,
                prompt: prompt.to_string(),
            },
            replacement,
        }
    }

    pub fn is_keypad(&self) -> bool {
        matches!(self.kind, DoorKind::Keypad { .. })
    }

    pub fn is_broken(&self) -> bool {
        self.replacement.is_none()
    }

    /// Short type label, as shown in door listings.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            DoorKind::Locked => "LockedDoor",
            DoorKind::Keypad { .. } => "LockedDoorWithKeypad",
        }
    }

    /// "a wooden door", or just the name when there is no prefix.
    pub fn full_name(&self) -> String {
        if self.prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.prefix, self.name)
        }
    }
}
