// src/map/registry.rs

use std::collections::HashMap;

use super::direction::Direction;
use super::tile::TileKey;

/// What a registered id names. Tiles and doors share one id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOwner {
    Tile(TileKey),
    Door { tile: TileKey, direction: Direction },
}

/// Id → object lookup, one per tile graph.
#[derive(Debug, Default, Clone)]
pub struct IdRegistry {
    ids: HashMap<String, IdOwner>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<IdOwner> {
        self.ids.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn insert(&mut self, id: &str, owner: IdOwner) -> Option<IdOwner> {
        self.ids.insert(id.to_string(), owner)
    }

    pub fn remove(&mut self, id: &str) -> Option<IdOwner> {
        self.ids.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// First `<prefix><n>` (n counting from 1) not yet registered.
    pub fn next_free(&self, prefix: &str) -> String {
        (1u64..)
            .map(|n| format!("{}{}", prefix, n))
            .find(|id| !self.ids.contains_key(id))
            .unwrap_or_else(|| prefix.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_free_skips_taken_ids() {
        let mut reg = IdRegistry::new();
        assert_eq!(reg.next_free("tile"), "tile1");
        reg.insert("tile1", IdOwner::Tile(TileKey(0)));
        reg.insert("tile2", IdOwner::Tile(TileKey(1)));
        assert_eq!(reg.next_free("tile"), "tile3");
        assert_eq!(reg.next_free("door"), "door1");
    }

    #[test]
    fn test_doors_and_tiles_share_namespace() {
        let mut reg = IdRegistry::new();
        reg.insert("gate", IdOwner::Door { tile: TileKey(0), direction: Direction::East });
        assert!(reg.contains("gate"));
        assert_eq!(
            reg.get("gate"),
            Some(IdOwner::Door { tile: TileKey(0), direction: Direction::East })
        );
        reg.remove("gate");
        assert!(reg.is_empty());
    }
}
