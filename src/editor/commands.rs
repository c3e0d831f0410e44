// src/editor/commands.rs

use std::fmt;
use std::str::FromStr;

use crate::document::Coord;
use crate::map::Direction;

/// Everything the user can ask the editor to do. Actions that work on "the
/// selected tile" use the document's selected cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    Select(Coord),
    MoveSelection(Direction),
    /// Create a tile in the selected cell, or edit the one there.
    EditSelected,
    DeleteSelected,
    SetStart,
    AddDoor,
    AddKeypadDoor,
    EditDoor(Direction),
    RemoveDoor(Direction),
    ListDoors,
    EditWalls,
    SaveDoorTemplate(Direction),
    AddDoorFromTemplate { direction: Direction, name: String },
    Save,
    SaveAs,
    Open,
    LoadSavedGame,
    New,
}

impl EditorAction {
    pub fn name(&self) -> &'static str {
        match self {
            EditorAction::Select(_) => "Select",
            EditorAction::MoveSelection(_) => "Move selection",
            EditorAction::EditSelected => "Edit tile",
            EditorAction::DeleteSelected => "Delete tile",
            EditorAction::SetStart => "Set start tile",
            EditorAction::AddDoor => "Add door",
            EditorAction::AddKeypadDoor => "Add keypad door",
            EditorAction::EditDoor(_) => "Edit door",
            EditorAction::RemoveDoor(_) => "Remove door",
            EditorAction::ListDoors => "List doors",
            EditorAction::EditWalls => "Edit walls",
            EditorAction::SaveDoorTemplate(_) => "Save door",
            EditorAction::AddDoorFromTemplate { .. } => "Add saved door",
            EditorAction::Save => "Save",
            EditorAction::SaveAs => "Save as",
            EditorAction::Open => "Open",
            EditorAction::LoadSavedGame => "Load saved game",
            EditorAction::New => "New map",
        }
    }

    /// Command words understood by `from_str`, with their arguments.
    pub fn help() -> &'static str {
        "select <row> <col> | up | down | left | right | edit | delete | start |\n\
         door | keypad | editdoor <dir> | undoor <dir> | doors | walls |\n\
         savedoor <dir> | usedoor <dir> <saved name> | save | saveas | open | import | new"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError(pub String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseActionError {}

fn dir_arg(arg: Option<&str>) -> Result<Direction, ParseActionError> {
    let arg = arg.ok_or_else(|| ParseActionError("expected a direction".to_string()))?;
    arg.parse().map_err(|_| ParseActionError(format!("unknown direction '{}'", arg)))
}

fn int_arg(arg: Option<&str>) -> Result<i32, ParseActionError> {
    let arg = arg.ok_or_else(|| ParseActionError("expected a number".to_string()))?;
    arg.parse().map_err(|_| ParseActionError(format!("'{}' is not a number", arg)))
}

impl FromStr for EditorAction {
    type Err = ParseActionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words
            .next()
            .ok_or_else(|| ParseActionError("empty command".to_string()))?;
        let action = match command.to_ascii_lowercase().as_str() {
            "select" => {
                let row = int_arg(words.next())?;
                let col = int_arg(words.next())?;
                EditorAction::Select(Coord::new(row, col))
            }
            "up" => EditorAction::MoveSelection(Direction::North),
            "down" => EditorAction::MoveSelection(Direction::South),
            "left" => EditorAction::MoveSelection(Direction::West),
            "right" => EditorAction::MoveSelection(Direction::East),
            "edit" => EditorAction::EditSelected,
            "delete" => EditorAction::DeleteSelected,
            "start" => EditorAction::SetStart,
            "door" => EditorAction::AddDoor,
            "keypad" => EditorAction::AddKeypadDoor,
            "editdoor" => EditorAction::EditDoor(dir_arg(words.next())?),
            "undoor" => EditorAction::RemoveDoor(dir_arg(words.next())?),
            "doors" => EditorAction::ListDoors,
            "walls" => EditorAction::EditWalls,
            "savedoor" => EditorAction::SaveDoorTemplate(dir_arg(words.next())?),
            "usedoor" => {
                let direction = dir_arg(words.next())?;
                let name = words.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    return Err(ParseActionError("expected a saved door name".to_string()));
                }
                return Ok(EditorAction::AddDoorFromTemplate { direction, name });
            }
            "save" => EditorAction::Save,
            "saveas" => EditorAction::SaveAs,
            "open" => EditorAction::Open,
            "import" => EditorAction::LoadSavedGame,
            "new" => EditorAction::New,
            other => return Err(ParseActionError(format!("unknown command '{}'", other))),
        };
        if let Some(extra) = words.next() {
            return Err(ParseActionError(format!("unexpected '{}'", extra)));
        }
        Ok(action)
    }
}
