// src/document/persist.rs

//! Reading and writing the native map file and importing the engine's
//! compressed save-game file.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::document::MapDocument;
use super::grid::{Coord, GridIndex};
use super::positions::{normalize, resolve, PositionConflict};
use super::templates::ObjectTemplates;
use crate::config::EditorConfig;
use crate::error::MapError;
use crate::map::records::{self, TileRecord, OBJECT_MODEL_VERSION};
use crate::map::TileKey;
use crate::utils::atomic_write;

fn current_version() -> u32 {
    OBJECT_MODEL_VERSION
}

/// On-disk layout of a native map file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapFile {
    #[serde(default = "current_version")]
    pub object_model_version: u32,
    pub tile_list: Vec<TileRecord>,
    pub start_tile: String,
    /// Tile id to `[row, col]`.
    pub positions: BTreeMap<String, Coord>,
    #[serde(default, skip_serializing_if = "ObjectTemplates::is_empty")]
    pub saved_objects: ObjectTemplates,
}

/// The part of an engine save this editor reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedGame {
    pub object_model_version: u32,
    pub tiles: Vec<TileRecord>,
    pub start_tile: String,
}

/// Per-tile keys holding `{location: [objects]}` lists that are emptied on
/// import.
const LOCATION_LISTS: [&str; 2] = ["items", "people"];
/// Per-tile keys removed on import.
const EVENT_KEYS: [&str; 2] = ["enter_event", "exit_event"];

/// Inflates and parses an engine save, dropping the run-time state (items,
/// people and events) from every tile.
pub fn decode_saved_game(bytes: &[u8]) -> Result<SavedGame, MapError> {
    let mut raw = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut raw)
        .map_err(|e| MapError::InvalidSaveFile(format!("not a zlib stream: {}", e)))?;
    let text = String::from_utf8(raw)
        .map_err(|e| MapError::InvalidSaveFile(format!("not UTF-8 text: {}", e)))?;
    let mut data: Value = serde_json::from_str(&text)
        .map_err(|e| MapError::InvalidSaveFile(format!("not JSON: {}", e)))?;

    let object = data
        .as_object_mut()
        .ok_or_else(|| MapError::InvalidSaveFile("top level is not an object".to_string()))?;
    let start_tile = match object.get("start_tile") {
        Some(Value::String(id)) => id.clone(),
        Some(_) => return Err(MapError::InvalidSaveFile("'start_tile' is not a string".to_string())),
        None => return Err(MapError::InvalidSaveFile("missing 'start_tile'".to_string())),
    };
    let version = match object.get("object_model_version") {
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| MapError::InvalidSaveFile("bad 'object_model_version'".to_string()))?,
        None => OBJECT_MODEL_VERSION,
    };
    let mut tiles = object
        .remove("tiles")
        .ok_or_else(|| MapError::InvalidSaveFile("missing 'tiles'".to_string()))?;

    strip_runtime_state(&mut tiles);
    let tiles: Vec<TileRecord> = serde_json::from_value(tiles)
        .map_err(|e| MapError::InvalidSaveFile(format!("bad tile list: {}", e)))?;

    Ok(SavedGame {
        object_model_version: version,
        tiles,
        start_tile,
    })
}

fn strip_runtime_state(tiles: &mut Value) {
    let Some(tiles) = tiles.as_array_mut() else {
        return;
    };
    for tile in tiles.iter_mut().filter_map(Value::as_object_mut) {
        for key in LOCATION_LISTS {
            if let Some(Value::Object(locations)) = tile.get_mut(key) {
                for objects in locations.values_mut() {
                    *objects = Value::Array(Vec::new());
                }
            }
        }
        for key in EVENT_KEYS {
            tile.remove(key);
        }
    }
}

impl MapDocument {
    /// Flattens the document for saving. Tiles placed on the grid but not
    /// reachable from the start tile are appended after the crawl.
    pub fn to_map_file(&self) -> Result<MapFile, MapError> {
        let start = self.start_tile().ok_or(MapError::NoStartTile)?;

        let mut order = records::crawl_order(&self.graph, start);
        let reached: HashSet<TileKey> = order.iter().copied().collect();
        let mut stray: Vec<(Coord, TileKey)> = self
            .grid
            .iter()
            .filter(|(_, key)| !reached.contains(key))
            .collect();
        stray.sort();
        if !stray.is_empty() {
            warn!("{} placed tile(s) are not reachable from the start tile", stray.len());
        }
        order.extend(stray.into_iter().map(|(_, key)| key));

        let mut tile_list = Vec::with_capacity(order.len());
        let mut positions = BTreeMap::new();
        for key in order {
            let Some(rec) = records::record(&self.graph, key) else {
                continue;
            };
            if let Some(coord) = self.grid.position_of(key) {
                positions.insert(rec.tile_id.clone(), coord);
            }
            tile_list.push(rec);
        }

        let start_tile = self
            .graph
            .get(start)
            .map(|t| t.tile_id.clone())
            .ok_or(MapError::NoStartTile)?;

        Ok(MapFile {
            object_model_version: OBJECT_MODEL_VERSION,
            tile_list,
            start_tile,
            positions,
            saved_objects: self.templates.clone(),
        })
    }

    /// Writes the native map file to `path` and remembers the path.
    pub fn save(&mut self, path: &Path) -> Result<(), MapError> {
        let file = self.to_map_file()?;
        let data = serde_json::to_vec_pretty(&file)?;
        atomic_write(path, &data)?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        info!("saved {} tiles to {}", file.tile_list.len(), path.display());
        Ok(())
    }

    /// Saves to the path the document came from.
    pub fn save_in_place(&mut self) -> Result<bool, MapError> {
        match self.path.clone() {
            Some(path) => self.save(&path).map(|_| true),
            None => Ok(false),
        }
    }

    /// Builds a document from a parsed map file.
    pub fn from_map_file(file: MapFile, config: EditorConfig) -> Result<MapDocument, MapError> {
        let (graph, start) =
            records::build(&file.tile_list, &file.start_tile, file.object_model_version)?;

        let mut grid = GridIndex::new();
        for (id, coord) in &file.positions {
            let Some(key) = graph.tile_by_id(id) else {
                warn!("position given for unknown tile '{}'", id);
                continue;
            };
            config.check_bounds(*coord)?;
            if let Some(other) = grid.get(*coord) {
                let first = graph.get(other).map(|t| t.tile_id.clone()).unwrap_or_default();
                return Err(MapError::PositionCollision {
                    first,
                    second: id.clone(),
                    coord: *coord,
                });
            }
            grid.insert(*coord, key);
        }

        let start_coord = grid
            .position_of(start)
            .ok_or_else(|| MapError::MissingStartPosition(file.start_tile.clone()))?;
        let unplaced = graph.len() - grid.len();
        if unplaced > 0 {
            warn!("{} tile(s) have no position and are not shown", unplaced);
        }

        let mut doc = MapDocument::new(config);
        doc.graph = graph;
        doc.grid = grid;
        doc.start = Some(start_coord);
        doc.selected = start_coord;
        doc.templates = file.saved_objects;
        Ok(doc)
    }

    /// Replaces this document with the map file at `path`. On error the
    /// current document is left as it was.
    pub fn load(&mut self, path: &Path) -> Result<(), MapError> {
        let text = fs::read_to_string(path)?;
        let file: MapFile = serde_json::from_str(&text)?;
        let mut doc = MapDocument::from_map_file(file, self.config.clone())?;
        doc.path = Some(path.to_path_buf());
        info!("loaded {} tiles from {}", doc.graph.len(), path.display());
        *self = doc;
        Ok(())
    }

    /// Builds a document from an engine save, laying tiles out by walking
    /// the graph from the start tile.
    pub fn from_saved_game(bytes: &[u8], config: EditorConfig) -> Result<MapDocument, MapError> {
        let saved = decode_saved_game(bytes)?;
        let (graph, start) =
            records::build(&saved.tiles, &saved.start_tile, saved.object_model_version)?;

        let mut resolution = resolve(&graph, start);
        let id_of = |key: TileKey| graph.get(key).map(|t| t.tile_id.clone()).unwrap_or_default();
        if let Some(PositionConflict::Collision { first, second, coord }) =
            resolution.collisions().next().copied()
        {
            return Err(MapError::PositionCollision {
                first: id_of(first),
                second: id_of(second),
                coord,
            });
        }
        normalize(&mut resolution.positions);

        let mut grid = GridIndex::new();
        for (key, coord) in &resolution.positions {
            config.check_bounds(*coord)?;
            grid.insert(*coord, *key);
        }
        let unplaced = graph.len() - grid.len();
        if unplaced > 0 {
            warn!("{} tile(s) are not reachable from the start tile and were not placed", unplaced);
        }

        let mut doc = MapDocument::new(config);
        doc.start = grid.position_of(start);
        doc.selected = doc.start.unwrap_or_default();
        doc.graph = graph;
        doc.grid = grid;
        Ok(doc)
    }

    /// Replaces this document with the map in an engine save file. The save
    /// path is not remembered, so the next save asks for a map file path.
    pub fn load_saved_game(&mut self, path: &Path) -> Result<(), MapError> {
        let bytes = fs::read(path)?;
        let doc = MapDocument::from_saved_game(&bytes, self.config.clone())?;
        info!("imported {} tiles from saved game {}", doc.graph.len(), path.display());
        *self = doc;
        Ok(())
    }
}
