// src/error.rs

use std::io;

use thiserror::Error;

use crate::document::Coord;
use crate::map::Direction;

/// Everything that can make an editing, loading or saving operation fail.
///
/// None of these are fatal: the operation is abandoned and the document is
/// left exactly as it was.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("tile ID field cannot be empty")]
    EmptyTileId,

    #[error("tile ID '{0}' already in use")]
    DuplicateTileId(String),

    #[error("no tile at {0}")]
    NoTileAt(Coord),

    #[error("{0} is outside the map grid")]
    OutOfBounds(Coord),

    #[error("there is already a tile at {0}")]
    CellOccupied(Coord),

    #[error("no start tile is set; a start tile must be set before saving")]
    NoStartTile,

    #[error("there is an existing door locked from the opposite direction (tile ID '{0}')")]
    OppositeDoorExists(String),

    #[error("tile '{tile_id}' already has a door ('{door_id}') on its {direction} side")]
    DoorExists {
        tile_id: String,
        door_id: String,
        direction: Direction,
    },

    #[error("tile '{tile_id}' has no door on its {direction} side")]
    NoDoor { tile_id: String, direction: Direction },

    #[error("invalid saved game file: {0}")]
    InvalidSaveFile(String),

    #[error("unsupported object model version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("unknown tile '{0}'")]
    UnknownTile(String),

    #[error("no saved object named '{0}'")]
    UnknownTemplate(String),

    #[error("start tile '{0}' has no position")]
    MissingStartPosition(String),

    #[error("tiles '{first}' and '{second}' both resolve to {coord}")]
    PositionCollision {
        first: String,
        second: String,
        coord: Coord,
    },

    #[error("invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MapError {
    /// Dialog heading for this error.
    pub fn heading(&self) -> &'static str {
        match self {
            MapError::EmptyTileId => "Invalid tile ID",
            MapError::DuplicateTileId(_) => "Unable to create tile",
            MapError::NoTileAt(_) | MapError::OutOfBounds(_) => "No tile here",
            MapError::CellOccupied(_) => "Unable to create tile",
            MapError::NoStartTile => "Unable to save map",
            MapError::OppositeDoorExists(_) | MapError::DoorExists { .. } => "Unable to add door",
            MapError::NoDoor { .. } => "Unable to edit door",
            MapError::UnknownTemplate(_) => "Unable to load saved object",
            MapError::InvalidSaveFile(_) | MapError::UnsupportedVersion { .. } => {
                "Error loading saved game state"
            }
            MapError::UnknownTile(_)
            | MapError::MissingStartPosition(_)
            | MapError::PositionCollision { .. } => "Error loading map data",
            MapError::InvalidField { .. } => "Invalid value",
            MapError::Io(_) | MapError::Json(_) => "File error",
        }
    }
}
