// src/map/records.rs

//! Flat, serializable form of a tile graph.
//!
//! `crawl` flattens the tiles reachable from a start tile into a list of
//! `TileRecord`s that refer to each other by id; `build` turns such a list
//! back into a live `TileGraph`. Both file formats carry this list.

use std::collections::{HashSet, VecDeque};

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::direction::Direction;
use super::door::{Door, DoorKind};
use super::graph::TileGraph;
use super::tile::{Link, Tile, TileAttributes, TileKey};
use crate::error::MapError;

/// Current version of the record layout. Files with a newer version are
/// rejected; older ones are read as-is.
pub const OBJECT_MODEL_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorRecord {
    pub tile_id: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub name: String,
    /// Present only on keypad doors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement_tile: Option<String>,
}

/// A link slot: either the neighbour's id or a door object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkRecord {
    Tile(String),
    Door(DoorRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub tile_id: String,
    #[serde(flatten)]
    pub attributes: TileAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub north: Option<LinkRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub south: Option<LinkRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub east: Option<LinkRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub west: Option<LinkRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub walls: Vec<Direction>,
    /// Keys this crate does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TileRecord {
    pub fn link(&self, dir: Direction) -> Option<&LinkRecord> {
        match dir {
            Direction::North => self.north.as_ref(),
            Direction::South => self.south.as_ref(),
            Direction::East => self.east.as_ref(),
            Direction::West => self.west.as_ref(),
        }
    }

    fn set_link(&mut self, dir: Direction, link: Option<LinkRecord>) {
        match dir {
            Direction::North => self.north = link,
            Direction::South => self.south = link,
            Direction::East => self.east = link,
            Direction::West => self.west = link,
        }
    }
}

/// Keys of every tile reachable from `start`, breadth first, seeing through
/// doors. Broken doors and stale keys are skipped.
pub fn crawl_order(graph: &TileGraph, start: TileKey) -> Vec<TileKey> {
    let mut order = Vec::new();
    if !graph.contains(start) {
        return order;
    }
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start]);
    seen.insert(start);

    while let Some(key) = queue.pop_front() {
        let Some(tile) = graph.get(key) else { continue };
        order.push(key);
        for dir in Direction::ALL {
            if let Some(next) = tile.neighbour(dir) {
                if graph.contains(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }
    order
}

/// Flattens the tiles reachable from `start`.
pub fn crawl(graph: &TileGraph, start: TileKey) -> Vec<TileRecord> {
    crawl_order(graph, start)
        .into_iter()
        .filter_map(|key| record(graph, key))
        .collect()
}

/// Record for one tile, links expressed as ids.
pub fn record(graph: &TileGraph, key: TileKey) -> Option<TileRecord> {
    let tile = graph.get(key)?;
    let id_of = |k: TileKey| graph.get(k).map(|t| t.tile_id.clone());

    let mut rec = TileRecord {
        tile_id: tile.tile_id.clone(),
        attributes: tile.attributes.clone(),
        north: None,
        south: None,
        east: None,
        west: None,
        walls: tile.walls().collect(),
        extra: tile.extra.clone(),
    };

    for dir in Direction::ALL {
        let link = match tile.link(dir) {
            Some(Link::Direct(k)) => id_of(*k).map(LinkRecord::Tile),
            Some(Link::Locked(door)) => Some(LinkRecord::Door(door_record(door, &id_of))),
            None => None,
        };
        rec.set_link(dir, link);
    }
    Some(rec)
}

fn door_record(door: &Door, id_of: &impl Fn(TileKey) -> Option<String>) -> DoorRecord {
    let (code, prompt) = match &door.kind {
        DoorKind::Locked => (None, None),
        DoorKind::Keypad { code, prompt } => (Some(*code), Some(prompt.clone())),
    };
    DoorRecord {
        tile_id: door.tile_id.clone(),
        prefix: door.prefix.clone(),
        name: door.name.clone(),
        code,
        prompt,
        replacement_tile: door.replacement.and_then(id_of),
    }
}

/// Rebuilds a graph from records and returns it with the start tile's key.
///
/// Duplicate ids and an unknown start tile are errors. Links naming tiles
/// that are not in `records` are dropped with a warning (a door keeps its
/// lock and loses its replacement).
pub fn build(
    records: &[TileRecord],
    start_tile_id: &str,
    version: u32,
) -> Result<(TileGraph, TileKey), MapError> {
    if version > OBJECT_MODEL_VERSION {
        return Err(MapError::UnsupportedVersion {
            found: version,
            supported: OBJECT_MODEL_VERSION,
        });
    }

    let mut graph = TileGraph::new();
    let mut keys = Vec::with_capacity(records.len());
    for rec in records {
        let mut tile = Tile::new(&rec.tile_id);
        tile.attributes = rec.attributes.clone();
        tile.extra = rec.extra.clone();
        for dir in &rec.walls {
            tile.set_wall(*dir, true);
        }
        keys.push(graph.add_tile(tile)?);
    }

    for (rec, &key) in records.iter().zip(&keys) {
        for dir in Direction::ALL {
            let link = match rec.link(dir) {
                None => continue,
                Some(LinkRecord::Tile(id)) => match graph.tile_by_id(id) {
                    Some(target) => Link::Direct(target),
                    None => {
                        warn!("tile '{}' links {} to unknown tile '{}'", rec.tile_id, dir, id);
                        continue;
                    }
                },
                Some(LinkRecord::Door(door)) => {
                    let id = graph.check_id(&door.tile_id, None)?;
                    Link::Locked(build_door(&graph, &rec.tile_id, &id, door))
                }
            };
            graph.replace_link(key, dir, Some(link));
        }
    }

    let start = graph
        .tile_by_id(start_tile_id)
        .ok_or_else(|| MapError::UnknownTile(start_tile_id.to_string()))?;
    Ok((graph, start))
}

fn build_door(graph: &TileGraph, owner: &str, id: &str, rec: &DoorRecord) -> Door {
    let replacement = rec.replacement_tile.as_deref().and_then(|target| {
        let key = graph.tile_by_id(target);
        if key.is_none() {
            warn!("door '{}' on tile '{}' leads to unknown tile '{}'", id, owner, target);
        }
        key
    });
    match rec.code {
        Some(code) => Door::keypad(
            id,
            &rec.prefix,
            &rec.name,
            code,
            rec.prompt.as_deref().unwrap_or_default(),
            replacement,
        ),
        None => Door::locked(id, &rec.prefix, &rec.name, replacement),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_in_a_row() -> (TileGraph, Vec<TileKey>) {
        let mut graph = TileGraph::new();
        let keys: Vec<TileKey> = ["a", "b", "c"]
            .iter()
            .map(|id| graph.add_tile(Tile::new(id)).unwrap())
            .collect();
        graph.link_pair(keys[0], Direction::East, keys[1]);
        graph.link_pair(keys[1], Direction::East, keys[2]);
        (graph, keys)
    }

    #[test]
    fn test_crawl_visits_reachable_tiles_breadth_first() {
        let (mut graph, keys) = three_in_a_row();
        let island = graph.add_tile(Tile::new("island")).unwrap();
        let order = crawl_order(&graph, keys[1]);
        assert_eq!(order, vec![keys[1], keys[2], keys[0]]);
        assert!(!order.contains(&island));
    }

    #[test]
    fn test_crawl_sees_through_doors() {
        let (mut graph, keys) = three_in_a_row();
        graph.insert_door(keys[1], Direction::East, Door::keypad("door1", "a", "door", 42, "code?", None));
        graph.replace_link(keys[2], Direction::West, None);

        let recs = crawl(&graph, keys[0]);
        let ids: Vec<&str> = recs.iter().map(|r| r.tile_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        match recs[1].link(Direction::East) {
            Some(LinkRecord::Door(door)) => {
                assert_eq!(door.code, Some(42));
                assert_eq!(door.replacement_tile.as_deref(), Some("c"));
            }
            other => panic!("expected door record, got {:?}", other),
        }
    }

    #[test]
    fn test_build_restores_links_doors_and_walls() {
        let (mut graph, keys) = three_in_a_row();
        graph.insert_door(keys[0], Direction::East, Door::locked("door1", "an", "oak door", None));
        graph.set_wall(keys[2], Direction::North, true);
        if let Some(tile) = graph.get_mut(keys[2]) {
            tile.extra.insert("items".to_string(), serde_json::json!({"on the floor": []}));
        }

        let recs = crawl(&graph, keys[0]);
        let (rebuilt, start) = build(&recs, "a", OBJECT_MODEL_VERSION).unwrap();
        assert_eq!(rebuilt.get(start).unwrap().tile_id, "a");

        let b = rebuilt.tile_by_id("b").unwrap();
        let c = rebuilt.tile_by_id("c").unwrap();
        let door = rebuilt.door(start, Direction::East).unwrap();
        assert_eq!(door.replacement, Some(b));
        assert_eq!(door.full_name(), "an oak door");
        assert!(rebuilt.id_in_use("door1"));
        assert_eq!(rebuilt.link(b, Direction::West), Some(&Link::Direct(start)));
        assert!(rebuilt.get(c).unwrap().has_wall(Direction::North));
        assert!(rebuilt.get(c).unwrap().extra.contains_key("items"));
    }

    #[test]
    fn test_build_rejects_newer_version_and_unknown_start() {
        let (graph, keys) = three_in_a_row();
        let recs = crawl(&graph, keys[0]);
        assert!(matches!(
            build(&recs, "a", OBJECT_MODEL_VERSION + 1),
            Err(MapError::UnsupportedVersion { .. })
        ));
        assert!(matches!(build(&recs, "zzz", OBJECT_MODEL_VERSION), Err(MapError::UnknownTile(_))));
    }

    #[test]
    fn test_build_drops_dangling_links() {
        let json = r#"[
            {"tile_id": "a", "east": "ghost"},
            {"tile_id": "b", "west": {"tile_id": "door1", "replacement_tile": "ghost"}}
        ]"#;
        let recs: Vec<TileRecord> = serde_json::from_str(json).unwrap();
        let (graph, a) = build(&recs, "a", OBJECT_MODEL_VERSION).unwrap();
        assert!(graph.link(a, Direction::East).is_none());
        let b = graph.tile_by_id("b").unwrap();
        assert!(graph.door(b, Direction::West).unwrap().is_broken());
    }

    #[test]
    fn test_record_json_shape() {
        let (graph, keys) = three_in_a_row();
        let rec = record(&graph, keys[0]).unwrap();
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["tile_id"], "a");
        assert_eq!(value["east"], "b");
        assert!(value.get("west").is_none());
        assert_eq!(value["first_visit_message_in_dark"], true);
    }
}
