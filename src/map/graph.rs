// src/map/graph.rs

use log::debug;

use super::direction::Direction;
use super::door::Door;
use super::registry::{IdOwner, IdRegistry};
use super::tile::{Link, Tile, TileKey};
use crate::error::MapError;
use crate::utils::util::non_empty;

/// Arena of tiles plus the id registry that keeps ids unique.
///
/// Keys are indices into `tiles`; removed tiles leave a hole so a stale key
/// resolves to `None` instead of to another tile.
#[derive(Debug, Default, Clone)]
pub struct TileGraph {
    tiles: Vec<Option<Tile>>,
    registry: IdRegistry,
}

impl TileGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: TileKey) -> Option<&Tile> {
        self.tiles.get(key.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, key: TileKey) -> Option<&mut Tile> {
        self.tiles.get_mut(key.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, key: TileKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of live tiles.
    pub fn len(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileKey, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (TileKey(i), t)))
    }

    // --- Id registry ---

    /// Whatever currently owns `id`, tile or door.
    pub fn lookup(&self, id: &str) -> Option<IdOwner> {
        self.registry.get(id)
    }

    pub fn tile_by_id(&self, id: &str) -> Option<TileKey> {
        match self.registry.get(id) {
            Some(IdOwner::Tile(key)) => Some(key),
            _ => None,
        }
    }

    pub fn id_in_use(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    pub fn next_free_id(&self, prefix: &str) -> String {
        self.registry.next_free(prefix)
    }

    /// Trims `id` and checks it is non-empty and free. `current` is the id the
    /// object already has; keeping it unchanged is always allowed.
    pub fn check_id(&self, id: &str, current: Option<&str>) -> Result<String, MapError> {
        let id = non_empty(id).ok_or(MapError::EmptyTileId)?;
        if current != Some(id) && self.registry.contains(id) {
            return Err(MapError::DuplicateTileId(id.to_string()));
        }
        Ok(id.to_string())
    }

    // --- Tiles ---

    /// Adds an unlinked tile. Any links already on `tile` are discarded.
    pub fn add_tile(&mut self, mut tile: Tile) -> Result<TileKey, MapError> {
        let id = self.check_id(&tile.tile_id, None)?;
        tile.tile_id = id;
        for dir in Direction::ALL {
            tile.take_link(dir);
        }
        let key = TileKey(self.tiles.len());
        self.registry.insert(&tile.tile_id, IdOwner::Tile(key));
        debug!("added tile '{}' as {:?}", tile.tile_id, key);
        self.tiles.push(Some(tile));
        Ok(key)
    }

    pub fn rename_tile(&mut self, key: TileKey, new_id: &str) -> Result<(), MapError> {
        let old_id = self
            .get(key)
            .map(|t| t.tile_id.clone())
            .ok_or_else(|| MapError::UnknownTile(format!("{:?}", key)))?;
        let new_id = self.check_id(new_id, Some(&old_id))?;
        if new_id == old_id {
            return Ok(());
        }
        self.registry.remove(&old_id);
        self.registry.insert(&new_id, IdOwner::Tile(key));
        if let Some(tile) = self.get_mut(key) {
            tile.tile_id = new_id;
        }
        Ok(())
    }

    /// Removes a tile and unregisters its id and the ids of its doors. Links
    /// other tiles hold to it are left for the caller to clear.
    pub fn remove_tile(&mut self, key: TileKey) -> Option<Tile> {
        let tile = self.tiles.get_mut(key.0)?.take()?;
        self.registry.remove(&tile.tile_id);
        for (_, door) in tile.doors() {
            self.registry.remove(&door.tile_id);
        }
        debug!("removed tile '{}'", tile.tile_id);
        Some(tile)
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
        self.registry.clear();
    }

    // --- Links ---

    pub fn link(&self, key: TileKey, dir: Direction) -> Option<&Link> {
        self.get(key).and_then(|t| t.link(dir))
    }

    /// Sets one slot, keeping door ids registered. Returns the old link.
    pub(crate) fn replace_link(
        &mut self,
        key: TileKey,
        dir: Direction,
        link: Option<Link>,
    ) -> Option<Link> {
        let new_door_id = link.as_ref().and_then(Link::door).map(|d| d.tile_id.clone());
        let tile = self.get_mut(key)?;
        let old = tile.set_link(dir, link);
        if let Some(door) = old.as_ref().and_then(Link::door) {
            self.registry.remove(&door.tile_id);
        }
        if let Some(id) = new_door_id {
            self.registry.insert(&id, IdOwner::Door { tile: key, direction: dir });
        }
        old
    }

    /// Links `from` to `to` through `dir` and `to` back through the reverse
    /// direction. A door already in `to`'s reverse slot keeps its lock and
    /// just gets `from` as its replacement.
    pub fn link_pair(&mut self, from: TileKey, dir: Direction, to: TileKey) {
        if !self.contains(from) || !self.contains(to) {
            return;
        }
        self.replace_link(from, dir, Some(Link::Direct(to)));

        let rev = dir.reverse();
        if let Some(tile) = self.get_mut(to) {
            match tile.link_mut(rev) {
                Some(Link::Locked(door)) => door.replacement = Some(from),
                _ => {
                    tile.set_link(rev, Some(Link::Direct(from)));
                }
            }
        }
    }

    /// Inverse of `link_pair`: clears `from`'s slot and `to`'s reverse slot.
    /// A door on `to`'s side stays in place with no replacement.
    pub fn unlink_pair(&mut self, from: TileKey, dir: Direction, to: TileKey) {
        self.replace_link(from, dir, None);

        let rev = dir.reverse();
        if let Some(tile) = self.get_mut(to) {
            match tile.link_mut(rev) {
                Some(Link::Locked(door)) => door.replacement = None,
                _ => {
                    tile.take_link(rev);
                }
            }
        }
    }

    // --- Doors ---

    pub fn door(&self, key: TileKey, dir: Direction) -> Option<&Door> {
        self.link(key, dir).and_then(Link::door)
    }

    /// Puts `door` into a slot that holds no door, wrapping whatever link was
    /// there as the door's replacement. The door id must already be checked.
    pub(crate) fn insert_door(&mut self, key: TileKey, dir: Direction, mut door: Door) {
        door.replacement = self.link(key, dir).and_then(Link::target);
        debug!("door '{}' added on {} side of {:?}", door.tile_id, dir, key);
        self.replace_link(key, dir, Some(Link::Locked(door)));
    }

    /// Takes the door out of a slot, leaving a direct link to its replacement.
    pub(crate) fn remove_door(&mut self, key: TileKey, dir: Direction) -> Option<Door> {
        let replacement = self.door(key, dir)?.replacement;
        let old = self.replace_link(key, dir, replacement.map(Link::Direct));
        match old {
            Some(Link::Locked(door)) => Some(door),
            _ => None,
        }
    }

    /// Mutable access to a door's authoring fields. Changing the id goes
    /// through `rename_door`.
    pub(crate) fn door_mut(&mut self, key: TileKey, dir: Direction) -> Option<&mut Door> {
        self.get_mut(key)?.link_mut(dir).and_then(Link::door_mut)
    }

    pub fn rename_door(&mut self, key: TileKey, dir: Direction, new_id: &str) -> Result<(), MapError> {
        let old_id = match self.door(key, dir) {
            Some(door) => door.tile_id.clone(),
            None => {
                return Err(MapError::NoDoor {
                    tile_id: self.get(key).map(|t| t.tile_id.clone()).unwrap_or_default(),
                    direction: dir,
                })
            }
        };
        let new_id = self.check_id(new_id, Some(&old_id))?;
        if new_id == old_id {
            return Ok(());
        }
        self.registry.remove(&old_id);
        self.registry.insert(&new_id, IdOwner::Door { tile: key, direction: dir });
        if let Some(door) = self.door_mut(key, dir) {
            door.tile_id = new_id;
        }
        Ok(())
    }

    // --- Walls ---

    pub(crate) fn set_wall(&mut self, key: TileKey, dir: Direction, wall: bool) {
        if let Some(tile) = self.get_mut(key) {
            tile.set_wall(dir, wall);
        }
    }

    /// True when either side of the `from`/`to` passage is walled.
    pub fn walled(&self, from: TileKey, dir: Direction, to: TileKey) -> bool {
        self.get(from).map_or(false, |t| t.has_wall(dir))
            || self.get(to).map_or(false, |t| t.has_wall(dir.reverse()))
    }
}
