// tests/document_round_trip.rs

use std::collections::BTreeSet;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::json;

use tgmap::config::EditorConfig;
use tgmap::document::{resolve, Coord, MapDocument};
use tgmap::map::{Direction, Door, Link, TileAttributes};
use tgmap::MapError;

fn doc() -> MapDocument {
    MapDocument::new(EditorConfig::default())
}

fn place(doc: &mut MapDocument, row: i32, col: i32, id: &str) {
    doc.place_tile(Coord::new(row, col), id, TileAttributes::default())
        .unwrap();
}

fn layout(doc: &MapDocument) -> BTreeSet<(String, Coord)> {
    doc.grid()
        .iter()
        .map(|(coord, key)| (doc.graph().get(key).unwrap().tile_id.clone(), coord))
        .collect()
}

#[test]
fn test_east_neighbour_scenario() {
    let mut doc = doc();
    place(&mut doc, 0, 0, "A");
    place(&mut doc, 0, 1, "B");
    let a = doc.key_at(Coord::new(0, 0)).unwrap();
    let b = doc.key_at(Coord::new(0, 1)).unwrap();

    assert_eq!(doc.graph().link(a, Direction::East), Some(&Link::Direct(b)));
    assert_eq!(doc.graph().link(b, Direction::West), Some(&Link::Direct(a)));

    let res = resolve(doc.graph(), a);
    assert_eq!(res.positions[&a], Coord::new(0, 0));
    assert_eq!(res.positions[&b], Coord::new(0, 1));
    assert!(res.conflicts.is_empty());
}

#[test]
fn test_resolved_neighbours_are_one_step_apart() {
    let mut doc = doc();
    for (row, col) in [(3, 3), (3, 4), (4, 4), (5, 4), (5, 3), (4, 3)] {
        place(&mut doc, row, col, &format!("t{}{}", row, col));
    }
    doc.add_door(Coord::new(4, 4), Direction::South, Door::locked("door1", "a", "gate", None))
        .unwrap();

    let root = doc.key_at(Coord::new(3, 3)).unwrap();
    let res = resolve(doc.graph(), root);
    assert_eq!(res.positions.len(), 6);
    for (key, tile) in doc.graph().iter() {
        for dir in Direction::ALL {
            let Some(next) = tile.neighbour(dir) else { continue };
            let (dr, dc) = dir.unit();
            let here = res.positions[&key];
            assert_eq!(res.positions[&next], Coord::new(here.row + dr, here.col + dc));
        }
    }
}

#[test]
fn test_save_and_load_round_trip() {
    let mut doc = doc();
    let attrs = TileAttributes {
        name: "Cellar".to_string(),
        smell_description: "damp".to_string(),
        dark: true,
        ..TileAttributes::default()
    };
    doc.place_tile(Coord::new(5, 5), "cellar", attrs.clone()).unwrap();
    place(&mut doc, 5, 6, "stairs");
    place(&mut doc, 6, 6, "vault");
    doc.add_door(Coord::new(5, 6), Direction::South, Door::keypad("door1", "a", "safe", 1234, "PIN?", None))
        .unwrap();
    doc.set_wall(Coord::new(5, 5), Direction::North, true).unwrap();
    doc.set_start(Coord::new(5, 6)).unwrap();
    doc.save_door_template(Coord::new(5, 6), Direction::South).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.json");
    doc.save(&path).unwrap();

    let mut loaded = MapDocument::new(EditorConfig::default());
    loaded.load(&path).unwrap();
    assert_eq!(layout(&loaded), layout(&doc));
    assert_eq!(loaded.start(), Some(Coord::new(5, 6)));
    assert_eq!(loaded.tile_at(Coord::new(5, 5)).unwrap().attributes, attrs);
    assert!(loaded.tile_at(Coord::new(5, 5)).unwrap().has_wall(Direction::North));
    assert_eq!(loaded.templates().len(), 1);

    let door = loaded.door(Coord::new(5, 6), Direction::South).unwrap();
    assert_eq!(door.replacement, loaded.key_at(Coord::new(6, 6)));
    assert!(door.is_keypad());
}

#[test]
fn test_connect_then_disconnect_restores_neighbours() {
    let mut doc = doc();
    place(&mut doc, 1, 0, "west");
    place(&mut doc, 0, 1, "north");
    place(&mut doc, 1, 2, "east");
    doc.add_door(Coord::new(0, 1), Direction::South, Door::locked("door1", "an", "iron door", None))
        .unwrap();
    let before: Vec<_> = doc.graph().iter().map(|(k, t)| (k, t.clone())).collect();

    let centre = Coord::new(1, 1);
    place(&mut doc, 1, 1, "centre");
    let door = doc.door(Coord::new(0, 1), Direction::South).unwrap();
    assert_eq!(door.replacement, doc.key_at(centre));

    let key = doc.key_at(centre).unwrap();
    doc.disconnect_surrounding(key, centre);
    for (k, tile) in before {
        assert_eq!(doc.graph().get(k), Some(&tile));
    }
}

#[test]
fn test_door_on_opposite_side_is_rejected() {
    let mut doc = doc();
    place(&mut doc, 0, 0, "A");
    place(&mut doc, 0, 1, "B");
    doc.add_door(Coord::new(0, 0), Direction::East, Door::locked("door1", "a", "door", None))
        .unwrap();
    let a = doc.tile_at(Coord::new(0, 0)).unwrap().clone();
    let b = doc.tile_at(Coord::new(0, 1)).unwrap().clone();

    let err = doc
        .add_door(Coord::new(0, 1), Direction::West, Door::locked("door2", "a", "door", None))
        .unwrap_err();
    assert!(matches!(err, MapError::OppositeDoorExists(id) if id == "door1"));
    assert_eq!(doc.tile_at(Coord::new(0, 0)), Some(&a));
    assert_eq!(doc.tile_at(Coord::new(0, 1)), Some(&b));
    assert!(!doc.graph().id_in_use("door2"));
}

#[test]
fn test_deleting_start_tile_blocks_save() {
    let mut doc = doc();
    place(&mut doc, 0, 0, "A");
    place(&mut doc, 0, 1, "B");
    doc.set_start(Coord::new(0, 0)).unwrap();
    doc.delete_tile(Coord::new(0, 0)).unwrap();
    assert_eq!(doc.start(), None);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.json");
    assert!(matches!(doc.save(&path), Err(MapError::NoStartTile)));
    assert!(!path.exists());
}

#[test]
fn test_imported_positions_are_shifted_to_origin() {
    // start at (0,0); "nw" ends up at (-3,-2) and "far" at (1,4)
    let save = json!({
        "start_tile": "s",
        "tiles": [
            {"tile_id": "s", "north": "n1", "west": "w1", "south": "d1", "east": "e1"},
            {"tile_id": "n1", "south": "s", "north": "n2"},
            {"tile_id": "n2", "south": "n1", "north": "n3"},
            {"tile_id": "n3", "south": "n2", "west": "n3w"},
            {"tile_id": "n3w", "east": "n3", "west": "nw"},
            {"tile_id": "nw", "east": "n3w"},
            {"tile_id": "w1", "east": "s"},
            {"tile_id": "d1", "north": "s", "east": "d2"},
            {"tile_id": "d2", "west": "d1", "east": "d3"},
            {"tile_id": "d3", "west": "d2", "east": "d4"},
            {"tile_id": "d4", "west": "d3", "east": "far"},
            {"tile_id": "far", "west": "d4"},
            {"tile_id": "e1", "west": "s"}
        ]
    });
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(save.to_string().as_bytes()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.sav");
    std::fs::write(&path, enc.finish().unwrap()).unwrap();

    let mut doc = doc();
    doc.load_saved_game(&path).unwrap();
    assert_eq!(doc.tile_at(Coord::new(0, 0)).unwrap().tile_id, "nw");
    assert_eq!(doc.tile_at(Coord::new(4, 6)).unwrap().tile_id, "far");
    assert_eq!(doc.start(), Some(Coord::new(3, 2)));
    let (min, _) = doc.grid().bounds().unwrap();
    assert_eq!(min, Coord::new(0, 0));
}
