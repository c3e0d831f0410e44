// src/document/positions.rs

//! Grid coordinates derived from the tile graph by breadth-first traversal.

use std::collections::{HashMap, VecDeque};

use log::warn;

use super::grid::Coord;
use crate::map::{Direction, TileGraph, TileKey};

/// A link that disagrees with the coordinates already assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionConflict {
    /// `tile` was reached again at a different cell; `kept` is the first one.
    Offset {
        tile: TileKey,
        kept: Coord,
        discarded: Coord,
    },
    /// Two distinct tiles resolved to the same cell.
    Collision {
        first: TileKey,
        second: TileKey,
        coord: Coord,
    },
}

#[derive(Debug, Default, Clone)]
pub struct Resolution {
    pub positions: HashMap<TileKey, Coord>,
    pub conflicts: Vec<PositionConflict>,
}

impl Resolution {
    pub fn collisions(&self) -> impl Iterator<Item = &PositionConflict> + '_ {
        self.conflicts
            .iter()
            .filter(|c| matches!(c, PositionConflict::Collision { .. }))
    }
}

/// Assigns a cell to every tile reachable from `root`, which sits at (0,0).
///
/// Doors are transparent: their replacement is placed, a broken door is
/// skipped. The first time a tile is dequeued fixes its cell. Disagreeing
/// links are reported in `conflicts` and logged, never applied.
pub fn resolve(graph: &TileGraph, root: TileKey) -> Resolution {
    let mut res = Resolution::default();
    if !graph.contains(root) {
        return res;
    }

    let mut occupied: HashMap<Coord, TileKey> = HashMap::new();
    let mut queue = VecDeque::from([(root, Coord::ORIGIN)]);

    while let Some((key, coord)) = queue.pop_front() {
        let Some(tile) = graph.get(key) else { continue };

        if let Some(&kept) = res.positions.get(&key) {
            if kept != coord {
                warn!(
                    "tile '{}' reached at {} but already placed at {}",
                    tile.tile_id, coord, kept
                );
                res.conflicts.push(PositionConflict::Offset {
                    tile: key,
                    kept,
                    discarded: coord,
                });
            }
            continue;
        }

        if let Some(&first) = occupied.get(&coord) {
            warn!(
                "tiles '{}' and '{}' both resolve to {}",
                id_of(graph, first),
                tile.tile_id,
                coord
            );
            res.conflicts.push(PositionConflict::Collision {
                first,
                second: key,
                coord,
            });
        } else {
            occupied.insert(coord, key);
        }
        res.positions.insert(key, coord);

        for dir in Direction::ALL {
            if let Some(next) = tile.neighbour(dir) {
                queue.push_back((next, coord.step(dir)));
            }
        }
    }
    res
}

fn id_of(graph: &TileGraph, key: TileKey) -> &str {
    graph.get(key).map_or("?", |t| t.tile_id.as_str())
}

/// Shifts every coordinate by the absolute value of the minimum row and
/// column, so a map resolved around (0,0) starts at the top-left cell.
pub fn normalize(positions: &mut HashMap<TileKey, Coord>) {
    let Some(min_row) = positions.values().map(|c| c.row).min() else {
        return;
    };
    let min_col = positions.values().map(|c| c.col).min().unwrap_or(0);
    let (dr, dc) = (min_row.abs(), min_col.abs());
    for coord in positions.values_mut() {
        coord.row += dr;
        coord.col += dc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Door, Link, Tile};

    fn graph_with(ids: &[&str]) -> (TileGraph, Vec<TileKey>) {
        let mut graph = TileGraph::new();
        let keys = ids
            .iter()
            .map(|id| graph.add_tile(Tile::new(id)).unwrap())
            .collect();
        (graph, keys)
    }

    #[test]
    fn test_neighbours_are_one_step_away() {
        let (mut graph, k) = graph_with(&["a", "b", "c", "d"]);
        graph.link_pair(k[0], Direction::East, k[1]);
        graph.link_pair(k[1], Direction::South, k[2]);
        graph.link_pair(k[0], Direction::North, k[3]);

        let res = resolve(&graph, k[0]);
        assert!(res.conflicts.is_empty());
        assert_eq!(res.positions[&k[0]], Coord::new(0, 0));
        assert_eq!(res.positions[&k[1]], Coord::new(0, 1));
        assert_eq!(res.positions[&k[2]], Coord::new(1, 1));
        assert_eq!(res.positions[&k[3]], Coord::new(-1, 0));

        for (key, tile) in graph.iter() {
            for dir in Direction::ALL {
                if let Some(next) = tile.neighbour(dir) {
                    assert_eq!(res.positions[&next], res.positions[&key].step(dir));
                }
            }
        }
    }

    #[test]
    fn test_doors_are_transparent_and_broken_doors_skipped() {
        let (mut graph, k) = graph_with(&["a", "b", "c"]);
        graph.link_pair(k[0], Direction::East, k[1]);
        graph.insert_door(k[0], Direction::East, Door::locked("door1", "a", "door", None));
        graph.insert_door(k[0], Direction::West, Door::locked("door2", "a", "door", None));

        let res = resolve(&graph, k[0]);
        assert_eq!(res.positions[&k[1]], Coord::new(0, 1));
        assert!(!res.positions.contains_key(&k[2]));
        assert_eq!(res.positions.len(), 2);
    }

    #[test]
    fn test_inconsistent_links_are_reported() {
        let (mut graph, k) = graph_with(&["a", "b", "c"]);
        graph.link_pair(k[0], Direction::East, k[1]);
        graph.link_pair(k[0], Direction::South, k[2]);
        // c claims b is to its east, which disagrees with b at (0,1)
        graph.replace_link(k[2], Direction::East, Some(Link::Direct(k[1])));
        let res = resolve(&graph, k[0]);
        assert_eq!(res.positions[&k[1]], Coord::new(0, 1));
        assert!(res.conflicts.iter().any(|c| matches!(
            c,
            PositionConflict::Offset { tile, discarded, .. }
                if *tile == k[1] && *discarded == Coord::new(1, 1)
        )));
        assert_eq!(res.collisions().count(), 0);
    }

    #[test]
    fn test_two_tiles_in_one_cell_is_a_collision() {
        let (mut graph, k) = graph_with(&["a", "b", "c", "d", "e"]);
        graph.link_pair(k[0], Direction::East, k[1]);
        graph.link_pair(k[0], Direction::South, k[2]);
        // d and e both claim (1,1)
        graph.replace_link(k[1], Direction::South, Some(Link::Direct(k[3])));
        graph.replace_link(k[2], Direction::East, Some(Link::Direct(k[4])));

        let res = resolve(&graph, k[0]);
        let collisions: Vec<_> = res.collisions().copied().collect();
        assert_eq!(collisions.len(), 1);
        match collisions[0] {
            PositionConflict::Collision { first, second, coord } => {
                assert_eq!(coord, Coord::new(1, 1));
                assert_ne!(first, second);
                assert!([k[3], k[4]].contains(&first));
                assert!([k[3], k[4]].contains(&second));
            }
            other => panic!("unexpected conflict {:?}", other),
        }
    }

    #[test]
    fn test_missing_root_gives_empty_map() {
        let (mut graph, k) = graph_with(&["a"]);
        graph.remove_tile(k[0]);
        let res = resolve(&graph, k[0]);
        assert!(res.positions.is_empty());
        assert!(res.conflicts.is_empty());
    }

    #[test]
    fn test_normalize_moves_north_west_corner_to_origin() {
        let mut positions = HashMap::new();
        positions.insert(TileKey(0), Coord::new(-3, -2));
        positions.insert(TileKey(1), Coord::new(1, 4));
        positions.insert(TileKey(2), Coord::new(0, 0));
        normalize(&mut positions);
        assert_eq!(positions[&TileKey(0)], Coord::new(0, 0));
        assert_eq!(positions[&TileKey(1)], Coord::new(4, 6));
        assert_eq!(positions[&TileKey(2)], Coord::new(3, 2));
    }
}
