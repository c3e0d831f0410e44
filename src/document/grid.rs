// src/document/grid.rs

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::map::{Direction, TileKey};

/// A grid cell, row-major. Rows grow southwards and columns eastwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { row: 0, col: 0 };

    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The neighbouring cell in `dir`.
    pub fn step(self, dir: Direction) -> Coord {
        let (dr, dc) = dir.unit();
        Coord::new(self.row + dr, self.col + dc)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((row, col): (i32, i32)) -> Self {
        Coord::new(row, col)
    }
}

impl From<Coord> for (i32, i32) {
    fn from(c: Coord) -> Self {
        (c.row, c.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Two-way index between grid cells and the tiles placed on them.
#[derive(Debug, Default, Clone)]
pub struct GridIndex {
    cells: HashMap<Coord, TileKey>,
    positions: HashMap<TileKey, Coord>,
}

impl GridIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coord: Coord) -> Option<TileKey> {
        self.cells.get(&coord).copied()
    }

    pub fn position_of(&self, key: TileKey) -> Option<Coord> {
        self.positions.get(&key).copied()
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Places `key` at `coord`, moving it if it was elsewhere. Returns the tile
    /// previously in the cell, if it was a different one.
    pub fn insert(&mut self, coord: Coord, key: TileKey) -> Option<TileKey> {
        if let Some(old) = self.positions.insert(key, coord) {
            self.cells.remove(&old);
        }
        let previous = self.cells.insert(coord, key).filter(|k| *k != key);
        if let Some(prev) = previous {
            self.positions.remove(&prev);
        }
        previous
    }

    pub fn remove(&mut self, coord: Coord) -> Option<TileKey> {
        let key = self.cells.remove(&coord)?;
        self.positions.remove(&key);
        Some(key)
    }

    /// Occupied cells adjacent to `coord`, in direction order.
    pub fn neighbours(&self, coord: Coord) -> impl Iterator<Item = (Direction, TileKey)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.get(coord.step(dir)).map(|key| (dir, key)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord, TileKey)> + '_ {
        self.cells.iter().map(|(c, k)| (*c, *k))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.positions.clear();
    }

    /// Smallest and largest occupied row/column, or `None` when empty.
    pub fn bounds(&self) -> Option<(Coord, Coord)> {
        let mut cells = self.cells.keys();
        let first = *cells.next()?;
        Some(cells.fold((first, first), |(min, max), c| {
            (
                Coord::new(min.row.min(c.row), min.col.min(c.col)),
                Coord::new(max.row.max(c.row), max.col.max(c.col)),
            )
        }))
    }
}
