// src/map/tile.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::direction::Direction;
use super::door::Door;

/// Handle to a tile inside a `TileGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey(pub(crate) usize);

impl TileKey {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a tile's directional slot points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Direct(TileKey),
    Locked(Door),
}

impl Link {
    /// The tile this link ends on, seeing through doors.
    pub fn target(&self) -> Option<TileKey> {
        match self {
            Link::Direct(key) => Some(*key),
            Link::Locked(door) => door.replacement,
        }
    }

    pub fn door(&self) -> Option<&Door> {
        match self {
            Link::Locked(door) => Some(door),
            Link::Direct(_) => None,
        }
    }

    pub fn door_mut(&mut self) -> Option<&mut Door> {
        match self {
            Link::Locked(door) => Some(door),
            Link::Direct(_) => None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Descriptive payload of a tile. The editor only copies these around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub first_visit_message: String,
    #[serde(default = "default_true")]
    pub first_visit_message_in_dark: bool,
    #[serde(default)]
    pub dark: bool,
    #[serde(default)]
    pub smell_description: String,
    #[serde(default)]
    pub ground_smell_description: String,
    #[serde(default)]
    pub ground_taste_description: String,
}

impl Default for TileAttributes {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            first_visit_message: String::new(),
            first_visit_message_in_dark: true,
            dark: false,
            smell_description: String::new(),
            ground_smell_description: String::new(),
            ground_taste_description: String::new(),
        }
    }
}

/// A navigable location.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub tile_id: String,
    pub attributes: TileAttributes,
    /// Engine data the editor does not model (items, people, events, ...).
    pub extra: Map<String, Value>,
    links: [Option<Link>; 4],
    walls: [bool; 4],
}

impl Tile {
    pub fn new(tile_id: &str) -> Self {
        Self {
            tile_id: tile_id.to_string(),
            attributes: TileAttributes::default(),
            extra: Map::new(),
            links: [None, None, None, None],
            walls: [false; 4],
        }
    }

    pub fn link(&self, dir: Direction) -> Option<&Link> {
        self.links[dir.index()].as_ref()
    }

    pub(crate) fn link_mut(&mut self, dir: Direction) -> Option<&mut Link> {
        self.links[dir.index()].as_mut()
    }

    /// Replaces the slot, returning what was there.
    pub(crate) fn set_link(&mut self, dir: Direction, link: Option<Link>) -> Option<Link> {
        std::mem::replace(&mut self.links[dir.index()], link)
    }

    pub(crate) fn take_link(&mut self, dir: Direction) -> Option<Link> {
        self.links[dir.index()].take()
    }

    /// Destination tile in `dir`, seeing through doors.
    pub fn neighbour(&self, dir: Direction) -> Option<TileKey> {
        self.link(dir).and_then(Link::target)
    }

    pub fn door(&self, dir: Direction) -> Option<&Door> {
        self.link(dir).and_then(Link::door)
    }

    pub fn doors(&self) -> impl Iterator<Item = (Direction, &Door)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.door(dir).map(|door| (dir, door)))
    }

    pub fn has_wall(&self, dir: Direction) -> bool {
        self.walls[dir.index()]
    }

    pub(crate) fn set_wall(&mut self, dir: Direction, wall: bool) {
        self.walls[dir.index()] = wall;
    }

    pub fn walls(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(move |dir| self.has_wall(*dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tile_has_no_links() {
        let tile = Tile::new("hall");
        for dir in Direction::ALL {
            assert!(tile.link(dir).is_none());
            assert!(!tile.has_wall(dir));
        }
        assert!(tile.attributes.first_visit_message_in_dark);
    }

    #[test]
    fn test_door_link_sees_through_to_replacement() {
        let mut tile = Tile::new("hall");
        let door = Door::locked("door1", "a", "door", Some(TileKey(7)));
        tile.set_link(Direction::East, Some(Link::Locked(door)));
        assert_eq!(tile.neighbour(Direction::East), Some(TileKey(7)));
        assert_eq!(tile.doors().count(), 1);

        if let Some(door) = tile.link_mut(Direction::East).and_then(Link::door_mut) {
            door.replacement = None;
        }
        assert_eq!(tile.neighbour(Direction::East), None);
        assert!(tile.door(Direction::East).map_or(false, Door::is_broken));
    }

    #[test]
    fn test_attributes_fill_defaults_when_missing() {
        let attrs: TileAttributes = serde_json::from_str(r#"{"name": "cellar"}"#).unwrap();
        assert_eq!(attrs.name, "cellar");
        assert!(attrs.first_visit_message_in_dark);
        assert!(!attrs.dark);
    }
}
