// src/document/mod.rs
mod document;
pub mod grid;
pub mod persist;
pub mod positions;
pub mod templates;

pub use self::document::MapDocument;
pub use grid::{Coord, GridIndex};
pub use persist::{decode_saved_game, MapFile, SavedGame};
pub use positions::{normalize, resolve, PositionConflict, Resolution};
pub use templates::ObjectTemplates;
