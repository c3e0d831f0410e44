// src/ui/ascii.rs

//! Plain-text picture of the map, used by the CLI.
//!
//! Each cell is one character: `@` start tile, `#` selected tile, `o` tile,
//! `+` selected empty cell, `.` empty cell. Between cells, `-` and `|` mark a
//! passage, `D` a door and `K` a keypad door.

use std::fmt::Write;

use crate::document::{Coord, MapDocument};
use crate::map::{Direction, Link};

fn passage(doc: &MapDocument, coord: Coord, dir: Direction, open: char) -> char {
    let link = doc.key_at(coord).and_then(|k| doc.graph().link(k, dir));
    match link {
        Some(Link::Direct(_)) => open,
        Some(Link::Locked(door)) if door.is_keypad() => 'K',
        Some(Link::Locked(_)) => 'D',
        None => ' ',
    }
}

fn cell(doc: &MapDocument, coord: Coord) -> char {
    let selected = doc.selected() == coord;
    match (doc.key_at(coord).is_some(), selected) {
        (true, _) if doc.start() == Some(coord) => '@',
        (true, true) => '#',
        (true, false) => 'o',
        (false, true) => '+',
        (false, false) => '.',
    }
}

/// Renders the occupied part of the grid (plus the selection).
pub fn render(doc: &MapDocument) -> String {
    let sel = doc.selected();
    let (min, max) = match doc.grid().bounds() {
        Some((min, max)) => (
            Coord::new(min.row.min(sel.row), min.col.min(sel.col)),
            Coord::new(max.row.max(sel.row), max.col.max(sel.col)),
        ),
        None => (sel, sel),
    };

    let mut out = String::new();
    for row in min.row..=max.row {
        let mut line = String::new();
        let mut below = String::new();
        for col in min.col..=max.col {
            let c = Coord::new(row, col);
            line.push(cell(doc, c));
            below.push(passage(doc, c, Direction::South, '|'));
            if col < max.col {
                line.push(passage(doc, c, Direction::East, '-'));
                below.push(' ');
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
        if row < max.row {
            let _ = writeln!(out, "{}", below.trim_end());
        }
    }
    out
}

/// One-paragraph description of the document.
pub fn summary(doc: &MapDocument) -> String {
    let graph = doc.graph();
    let doors: usize = graph.iter().map(|(_, t)| t.doors().count()).sum();
    let start = doc
        .start_tile()
        .and_then(|k| graph.get(k))
        .map_or_else(|| "none".to_string(), |t| format!("'{}'", t.tile_id));
    format!(
        "{} tiles ({} placed), {} doors, start tile {}",
        graph.len(),
        doc.grid().len(),
        doors,
        start
    )
}
