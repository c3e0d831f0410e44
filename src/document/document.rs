// src/document/document.rs

use std::path::{Path, PathBuf};

use log::{debug, info};

use super::grid::{Coord, GridIndex};
use super::templates::ObjectTemplates;
use crate::config::EditorConfig;
use crate::error::MapError;
use crate::map::{Direction, Door, Tile, TileAttributes, TileGraph, TileKey};
use crate::utils::util::clamp;

/// The map being edited: tile graph, where each tile sits on the grid, the
/// start marker and editing state.
#[derive(Debug, Clone, Default)]
pub struct MapDocument {
    pub(super) graph: TileGraph,
    pub(super) grid: GridIndex,
    pub(super) start: Option<Coord>,
    pub(super) selected: Coord,
    pub(super) dirty: bool,
    pub(super) path: Option<PathBuf>,
    pub(super) templates: ObjectTemplates,
    pub(super) config: EditorConfig,
}

impl MapDocument {
    /// Create a new empty document.
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // --- Read access ---

    pub fn graph(&self) -> &TileGraph {
        &self.graph
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn templates(&self) -> &ObjectTemplates {
        &self.templates
    }

    pub fn start(&self) -> Option<Coord> {
        self.start
    }

    /// Key of the start tile, if the marker sits on a tile.
    pub fn start_tile(&self) -> Option<TileKey> {
        self.start.and_then(|c| self.grid.get(c))
    }

    pub fn selected(&self) -> Coord {
        self.selected
    }

    /// True when there are changes since the last save or load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// File the document was loaded from or last saved to.
    pub fn loaded_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn key_at(&self, coord: Coord) -> Option<TileKey> {
        self.grid.get(coord)
    }

    pub fn tile_at(&self, coord: Coord) -> Option<&Tile> {
        self.grid.get(coord).and_then(|k| self.graph.get(k))
    }

    fn require_tile(&self, coord: Coord) -> Result<TileKey, MapError> {
        self.grid.get(coord).ok_or(MapError::NoTileAt(coord))
    }

    /// First free `<prefix>N` id for a new tile.
    pub fn default_tile_id(&self) -> String {
        self.graph.next_free_id(&self.config.tile_id_prefix)
    }

    /// First free `<prefix>N` id for a new door.
    pub fn default_door_id(&self) -> String {
        self.graph.next_free_id(&self.config.door_id_prefix)
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    // --- Tiles ---

    /// Creates a tile at an empty cell, or updates the tile already there.
    pub fn apply_tile(
        &mut self,
        coord: Coord,
        tile_id: &str,
        attributes: TileAttributes,
    ) -> Result<TileKey, MapError> {
        if self.grid.is_occupied(coord) {
            self.edit_tile(coord, tile_id, attributes)
        } else {
            self.place_tile(coord, tile_id, attributes)
        }
    }

    /// Places a new tile at an empty cell and connects it to every placed
    /// neighbour.
    pub fn place_tile(
        &mut self,
        coord: Coord,
        tile_id: &str,
        attributes: TileAttributes,
    ) -> Result<TileKey, MapError> {
        self.config.check_bounds(coord)?;
        if self.grid.is_occupied(coord) {
            return Err(MapError::CellOccupied(coord));
        }

        let mut tile = Tile::new(tile_id);
        tile.attributes = attributes;
        let key = self.graph.add_tile(tile)?;
        self.grid.insert(coord, key);
        self.connect_surrounding(key, coord);
        self.touch();
        info!("placed tile '{}' at {}", tile_id.trim(), coord);
        Ok(key)
    }

    /// Updates the id and payload of the tile at `coord`. Links are untouched.
    pub fn edit_tile(
        &mut self,
        coord: Coord,
        tile_id: &str,
        attributes: TileAttributes,
    ) -> Result<TileKey, MapError> {
        let key = self.require_tile(coord)?;
        self.graph.rename_tile(key, tile_id)?;
        if let Some(tile) = self.graph.get_mut(key) {
            tile.attributes = attributes;
        }
        self.touch();
        Ok(key)
    }

    /// Links `key` (sitting at `coord`) with each placed neighbour that is not
    /// walled off.
    pub fn connect_surrounding(&mut self, key: TileKey, coord: Coord) {
        let neighbours: Vec<_> = self.grid.neighbours(coord).collect();
        for (dir, other) in neighbours {
            if other == key || self.graph.walled(key, dir, other) {
                continue;
            }
            self.graph.link_pair(key, dir, other);
            debug!("connected {} side of {}", dir, coord);
        }
    }

    /// Clears every link of `key` and the matching slot on each neighbour. A
    /// neighbour's door pointing back here is kept but left broken.
    pub fn disconnect_surrounding(&mut self, key: TileKey, coord: Coord) {
        for dir in Direction::ALL {
            match self.grid.get(coord.step(dir)) {
                Some(other) if other != key => self.graph.unlink_pair(key, dir, other),
                _ => {
                    self.graph.replace_link(key, dir, None);
                }
            }
        }
    }

    /// Removes the tile at `coord`, its doors and the start marker if it was
    /// the start tile.
    pub fn delete_tile(&mut self, coord: Coord) -> Result<Tile, MapError> {
        let key = self.require_tile(coord)?;
        self.disconnect_surrounding(key, coord);
        self.grid.remove(coord);
        if self.start == Some(coord) {
            self.start = None;
        }
        let tile = self
            .graph
            .remove_tile(key)
            .ok_or(MapError::NoTileAt(coord))?;
        self.touch();
        info!("deleted tile '{}' at {}", tile.tile_id, coord);
        Ok(tile)
    }

    /// Marks the tile at `coord` as the start tile.
    pub fn set_start(&mut self, coord: Coord) -> Result<(), MapError> {
        self.require_tile(coord)?;
        self.start = Some(coord);
        self.touch();
        Ok(())
    }

    // --- Doors ---

    /// Puts `door` on the `dir` side of the tile at `coord`. Whatever the slot
    /// linked to becomes the door's destination.
    pub fn add_door(&mut self, coord: Coord, dir: Direction, mut door: Door) -> Result<(), MapError> {
        let key = self.require_tile(coord)?;
        door.tile_id = self.graph.check_id(&door.tile_id, None)?;

        let neighbour = self
            .graph
            .get(key)
            .and_then(|t| t.neighbour(dir))
            .or_else(|| self.grid.get(coord.step(dir)));
        if let Some(opposite) = neighbour.and_then(|n| self.graph.door(n, dir.reverse())) {
            return Err(MapError::OppositeDoorExists(opposite.tile_id.clone()));
        }
        if let Some(existing) = self.graph.door(key, dir) {
            return Err(MapError::DoorExists {
                tile_id: self.graph.get(key).map(|t| t.tile_id.clone()).unwrap_or_default(),
                door_id: existing.tile_id.clone(),
                direction: dir,
            });
        }

        info!("added {} '{}' on {} side of {}", door.type_name(), door.tile_id, dir, coord);
        self.graph.insert_door(key, dir, door);
        self.touch();
        Ok(())
    }

    /// Takes the door off a slot; the slot links straight to where the door led.
    pub fn remove_door(&mut self, coord: Coord, dir: Direction) -> Result<Door, MapError> {
        let key = self.require_tile(coord)?;
        let door = self
            .graph
            .remove_door(key, dir)
            .ok_or_else(|| self.no_door(key, dir))?;
        self.touch();
        Ok(door)
    }

    /// Replaces the id, prefix, name and kind of an existing door with those
    /// of `edited`. The door keeps its destination.
    pub fn update_door(&mut self, coord: Coord, dir: Direction, edited: Door) -> Result<(), MapError> {
        let key = self.require_tile(coord)?;
        if self.graph.door(key, dir).is_none() {
            return Err(self.no_door(key, dir));
        }
        self.graph.rename_door(key, dir, &edited.tile_id)?;
        if let Some(door) = self.graph.door_mut(key, dir) {
            door.prefix = edited.prefix;
            door.name = edited.name;
            door.kind = edited.kind;
        }
        self.touch();
        Ok(())
    }

    pub fn door(&self, coord: Coord, dir: Direction) -> Option<&Door> {
        self.graph.door(self.grid.get(coord)?, dir)
    }

    /// Doors on the tile at `coord`, in direction order.
    pub fn doors_on(&self, coord: Coord) -> Result<Vec<(Direction, &Door)>, MapError> {
        let key = self.require_tile(coord)?;
        Ok(self
            .graph
            .get(key)
            .map(|t| t.doors().collect())
            .unwrap_or_default())
    }

    fn no_door(&self, key: TileKey, dir: Direction) -> MapError {
        MapError::NoDoor {
            tile_id: self.graph.get(key).map(|t| t.tile_id.clone()).unwrap_or_default(),
            direction: dir,
        }
    }

    /// Stores the door on a slot as a reusable template and returns its name.
    pub fn save_door_template(&mut self, coord: Coord, dir: Direction) -> Result<String, MapError> {
        let door = self
            .door(coord, dir)
            .cloned()
            .ok_or_else(|| MapError::NoDoor {
                tile_id: self.tile_at(coord).map(|t| t.tile_id.clone()).unwrap_or_default(),
                direction: dir,
            })?;
        let name = self.templates.save_door(&door)?;
        self.touch();
        Ok(name)
    }

    /// Adds a door built from a saved template, with a fresh id.
    pub fn add_door_from_template(
        &mut self,
        coord: Coord,
        dir: Direction,
        template: &str,
    ) -> Result<(), MapError> {
        let door = self
            .templates
            .door(template, &self.default_door_id())
            .ok_or_else(|| MapError::UnknownTemplate(template.to_string()))?;
        self.add_door(coord, dir, door)
    }

    pub fn remove_template(&mut self, name: &str) -> bool {
        let removed = self.templates.remove(name).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    // --- Walls ---

    /// Adds or removes the wall on one side of the tile at `coord`. A wall cuts
    /// the passage on both tiles; removing it reconnects a placed neighbour.
    ///
    /// Doors survive wall changes on either side of the passage: a wall
    /// leaves the door broken and removing it gives the door its destination
    /// back.
    pub fn set_wall(&mut self, coord: Coord, dir: Direction, wall: bool) -> Result<(), MapError> {
        let key = self.require_tile(coord)?;
        let had_wall = self.graph.get(key).map_or(false, |t| t.has_wall(dir));
        if had_wall == wall {
            return Ok(());
        }
        self.graph.set_wall(key, dir, wall);

        let neighbour = self.grid.get(coord.step(dir));
        match (wall, neighbour) {
            (true, Some(other)) => {
                let (from, side, to) = self.door_facing(key, dir, other);
                self.graph.unlink_pair(from, side, to);
            }
            (true, None) => {
                if self.graph.door(key, dir).is_none() {
                    self.graph.replace_link(key, dir, None);
                }
            }
            (false, Some(other)) => {
                if !self.graph.walled(key, dir, other) {
                    let (from, side, to) = self.door_facing(key, dir, other);
                    self.graph.link_pair(from, side, to);
                }
            }
            (false, None) => {}
        }
        self.touch();
        Ok(())
    }

    /// Orders a passage so that a door on it, if any, sits on the far side.
    /// `link_pair` and `unlink_pair` keep a far-side door and only change its
    /// replacement.
    fn door_facing(
        &self,
        key: TileKey,
        dir: Direction,
        other: TileKey,
    ) -> (TileKey, Direction, TileKey) {
        if self.graph.door(key, dir).is_some() {
            (other, dir.reverse(), key)
        } else {
            (key, dir, other)
        }
    }

    /// Sets all four walls of a tile at once, in `Direction::ALL` order.
    pub fn set_walls(&mut self, coord: Coord, walls: [bool; 4]) -> Result<(), MapError> {
        self.require_tile(coord)?;
        for (dir, wall) in Direction::ALL.into_iter().zip(walls) {
            self.set_wall(coord, dir, wall)?;
        }
        Ok(())
    }

    pub fn walls(&self, coord: Coord) -> Result<[bool; 4], MapError> {
        let key = self.require_tile(coord)?;
        let tile = self.graph.get(key).ok_or(MapError::NoTileAt(coord))?;
        Ok(Direction::ALL.map(|dir| tile.has_wall(dir)))
    }

    // --- Selection ---

    pub fn select(&mut self, coord: Coord) -> Result<(), MapError> {
        self.config.check_bounds(coord)?;
        self.selected = coord;
        Ok(())
    }

    /// Moves the selection one cell, stopping at the grid edges.
    pub fn move_selection(&mut self, dir: Direction) -> Coord {
        let next = self.selected.step(dir);
        self.selected = Coord::new(
            clamp(next.row, 0, self.config.grid_rows - 1),
            clamp(next.col, 0, self.config.grid_cols - 1),
        );
        self.selected
    }

    /// Empties the document, keeping its configuration.
    pub fn clear(&mut self) {
        *self = MapDocument::new(self.config.clone());
    }
}
