// src/terminal/preview.rs

//! A minimal engine for trying out a map: walk between tiles, read their
//! descriptions and get through doors. Items, people and events are ignored.

use std::collections::HashSet;

use super::{GameEngine, TerminalIo};
use crate::document::MapFile;
use crate::error::MapError;
use crate::map::{records, Direction, Door, DoorKind, Link, TileGraph, TileKey};

const HELP: &str = "Commands: north/south/east/west (or n/s/e/w), look, \
                    unlock <direction>, help, quit";

/// Plays a serialized map file. The map is parsed on the engine thread, so
/// the game never shares state with the editor.
pub struct PreviewEngine {
    map_json: String,
}

impl PreviewEngine {
    pub fn new(map_json: String) -> Self {
        Self { map_json }
    }
}

impl GameEngine for PreviewEngine {
    fn run(&mut self, io: &mut TerminalIo) -> Result<(), MapError> {
        let file: MapFile = serde_json::from_str(&self.map_json)?;
        let (graph, start) =
            records::build(&file.tile_list, &file.start_tile, file.object_model_version)?;
        let mut walk = Walk::new(graph, start);

        walk.enter(start, io);
        while let Some(line) = io.read_line() {
            let line = line.trim().to_ascii_lowercase();
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (None, _) => {}
                (Some("quit" | "q"), _) => {
                    io.write_line("Goodbye.");
                    return Ok(());
                }
                (Some("help" | "?"), _) => io.write_line(HELP),
                (Some("look" | "l"), _) => walk.describe(io),
                (Some("unlock"), Some(dir)) => match dir.parse() {
                    Ok(dir) => walk.unlock(dir, io),
                    Err(_) => io.write_line(&format!("'{}' is not a direction.", dir)),
                },
                (Some(word), None) => match word.parse::<Direction>() {
                    Ok(dir) => walk.go(dir, io),
                    Err(_) => io.write_line(&format!("I don't understand '{}'.", line)),
                },
                _ => io.write_line(&format!("I don't understand '{}'.", line)),
            }
        }
        Ok(())
    }
}

struct Walk {
    graph: TileGraph,
    here: TileKey,
    visited: HashSet<TileKey>,
    /// Ids of doors the player has opened.
    unlocked: HashSet<String>,
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Walk {
    fn new(graph: TileGraph, start: TileKey) -> Self {
        Self {
            graph,
            here: start,
            visited: HashSet::new(),
            unlocked: HashSet::new(),
        }
    }

    fn enter(&mut self, key: TileKey, io: &mut TerminalIo) {
        self.here = key;
        let first_visit = self.visited.insert(key);
        let Some(tile) = self.graph.get(key) else {
            return;
        };
        let a = &tile.attributes;
        if first_visit
            && !a.first_visit_message.is_empty()
            && (!a.dark || a.first_visit_message_in_dark)
        {
            io.write_line(&a.first_visit_message);
        }
        self.describe(io);
    }

    fn describe(&self, io: &mut TerminalIo) {
        let Some(tile) = self.graph.get(self.here) else {
            return;
        };
        let a = &tile.attributes;
        let title = if a.name.is_empty() { &tile.tile_id } else { &a.name };
        io.write_line(&format!("[{}]", title));
        if a.dark {
            io.write_line("It is too dark to see anything.");
        } else if !a.description.is_empty() {
            io.write_line(&a.description);
        }

        let exits: Vec<String> = Direction::ALL
            .into_iter()
            .filter_map(|dir| match tile.link(dir)? {
                Link::Direct(_) => Some(dir.to_string()),
                Link::Locked(door) if self.unlocked.contains(&door.tile_id) => Some(dir.to_string()),
                Link::Locked(door) => Some(format!("{} ({})", dir, door.full_name())),
            })
            .collect();
        if exits.is_empty() {
            io.write_line("There are no exits.");
        } else {
            io.write_line(&format!("Exits: {}", exits.join(", ")));
        }
    }

    fn go(&mut self, dir: Direction, io: &mut TerminalIo) {
        let Some(tile) = self.graph.get(self.here) else {
            return;
        };
        let target = match tile.link(dir) {
            None if tile.has_wall(dir) => {
                io.write_line("There is a wall in the way.");
                return;
            }
            None => {
                io.write_line("You can't go that way.");
                return;
            }
            Some(Link::Direct(key)) => Some(*key),
            Some(Link::Locked(door)) => {
                let door = door.clone();
                if !self.unlocked.contains(&door.tile_id) && !self.open(&door, io) {
                    return;
                }
                door.replacement
            }
        };
        match target.filter(|k| self.graph.contains(*k)) {
            Some(key) => self.enter(key, io),
            None => io.write_line("That way leads nowhere."),
        }
    }

    /// Tries to get through a closed door. Keypad doors ask for their code.
    fn open(&mut self, door: &Door, io: &mut TerminalIo) -> bool {
        match &door.kind {
            DoorKind::Locked => {
                io.write_line(&format!("{} is locked.", capitalize(&door.full_name())));
                false
            }
            DoorKind::Keypad { code, prompt } => {
                io.write_line(prompt);
                let Some(answer) = io.read_line() else {
                    return false;
                };
                if answer.trim().parse::<i64>().ok() == Some(*code) {
                    io.write_line(&format!("{} unlocks.", capitalize(&door.full_name())));
                    self.unlocked.insert(door.tile_id.clone());
                    true
                } else {
                    io.write_line("Wrong code.");
                    false
                }
            }
        }
    }

    /// Opens a key-locked door. The preview has no inventory, so any locked
    /// door can be unlocked this way.
    fn unlock(&mut self, dir: Direction, io: &mut TerminalIo) {
        let door = self
            .graph
            .get(self.here)
            .and_then(|t| t.door(dir))
            .cloned();
        match door {
            None => io.write_line("There is no door there."),
            Some(door) if door.is_keypad() => {
                io.write_line(&format!("{} has a keypad.", capitalize(&door.full_name())));
            }
            Some(door) => {
                io.write_line(&format!("You unlock {}.", door.full_name()));
                self.unlocked.insert(door.tile_id);
            }
        }
    }
}
