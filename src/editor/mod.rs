// src/editor/mod.rs

pub mod commands;
pub mod forms;

pub use commands::{EditorAction, ParseActionError};
pub use forms::{
    DoorSettings, Editable, FieldKind, FieldSpec, FieldValue, FormValues, KeypadDoorSettings,
    TileSettings, WallSettings,
};

use std::path::PathBuf;

use log::{error, info};

use crate::document::{Coord, MapDocument};
use crate::error::MapError;
use crate::map::{Direction, Door};
use crate::ui::{Dialog, DialogResult, EditorUi, FilePurpose, FormOutcome};

/// Drives a `MapDocument` from user actions, asking the UI for forms,
/// confirmations and paths. Failed actions never change the document; the
/// error is logged, shown and kept in `error_message`.
pub struct Editor<U: EditorUi> {
    document: MapDocument,
    ui: U,

    /// Messages or status for UI.
    pub status_message: String,
    pub error_message: Option<String>,
}

impl<U: EditorUi> Editor<U> {
    pub fn new(document: MapDocument, ui: U) -> Self {
        Self {
            document,
            ui,
            status_message: String::new(),
            error_message: None,
        }
    }

    pub fn document(&self) -> &MapDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut MapDocument {
        &mut self.document
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn into_parts(self) -> (MapDocument, U) {
        (self.document, self.ui)
    }

    /// Selects the clicked cell.
    pub fn click(&mut self, coord: Coord) -> bool {
        self.execute(EditorAction::Select(coord))
    }

    /// Selects the clicked cell and opens the tile form for it.
    pub fn double_click(&mut self, coord: Coord) -> bool {
        self.click(coord) && self.execute(EditorAction::EditSelected)
    }

    /// Runs one action. Returns `false` when it failed; the reason is in
    /// `error_message`.
    pub fn execute(&mut self, action: EditorAction) -> bool {
        let name = action.name();
        match self.run(action) {
            Ok(Some(status)) => {
                info!("{}", status);
                self.status_message = status;
                self.error_message = None;
                true
            }
            Ok(None) => {
                self.status_message = format!("{} cancelled", name);
                true
            }
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    fn report(&mut self, err: &MapError) {
        error!("{}: {}", err.heading(), err);
        self.ui.show_error(err.heading(), &err.to_string());
        self.error_message = Some(err.to_string());
    }

    /// Shows `settings` in a form until the user cancels or `commit`
    /// succeeds. Rejected input is reported and the form shown again with
    /// the user's values kept.
    fn edit_form<S, F>(&mut self, settings: &mut S, mut commit: F) -> Result<Option<String>, MapError>
    where
        S: Editable + Clone,
        F: FnMut(&mut MapDocument, &S) -> Result<String, MapError>,
    {
        let mut values = settings.values();
        loop {
            if self.ui.run_form(settings.title(), settings.fields(), &mut values) == FormOutcome::Cancelled {
                return Ok(None);
            }
            let mut attempt = settings.clone();
            let result = attempt
                .apply(&values)
                .and_then(|_| commit(&mut self.document, &attempt));
            match result {
                Ok(status) => {
                    *settings = attempt;
                    return Ok(Some(status));
                }
                Err(err) => self.report(&err),
            }
        }
    }

    fn run(&mut self, action: EditorAction) -> Result<Option<String>, MapError> {
        let sel = self.document.selected();
        match action {
            EditorAction::Select(coord) => {
                self.document.select(coord)?;
                Ok(Some(format!("Selected {}", coord)))
            }
            EditorAction::MoveSelection(dir) => {
                let coord = self.document.move_selection(dir);
                Ok(Some(format!("Selected {}", coord)))
            }
            EditorAction::EditSelected => self.edit_tile(sel),
            EditorAction::DeleteSelected => self.delete_tile(sel),
            EditorAction::SetStart => {
                self.document.set_start(sel)?;
                Ok(Some(format!("Start tile set to {}", self.tile_id(sel))))
            }
            EditorAction::AddDoor => self.add_door(sel, false),
            EditorAction::AddKeypadDoor => self.add_door(sel, true),
            EditorAction::EditDoor(dir) => self.edit_door(sel, dir),
            EditorAction::RemoveDoor(dir) => {
                let door = self.document.remove_door(sel, dir)?;
                Ok(Some(format!("Removed door '{}'", door.tile_id)))
            }
            EditorAction::ListDoors => {
                let doors = self.document.doors_on(sel)?;
                if doors.is_empty() {
                    return Ok(Some(format!("Tile {} has no doors", self.tile_id(sel))));
                }
                let listing: Vec<String> = doors
                    .iter()
                    .map(|(dir, door)| {
                        format!("{}: {} '{}' ({})", dir, door.type_name(), door.tile_id, door.full_name())
                    })
                    .collect();
                Ok(Some(listing.join("\n")))
            }
            EditorAction::EditWalls => self.edit_walls(sel),
            EditorAction::SaveDoorTemplate(dir) => {
                let name = self.document.save_door_template(sel, dir)?;
                Ok(Some(format!("Saved door as '{}'", name)))
            }
            EditorAction::AddDoorFromTemplate { direction, name } => {
                self.document.add_door_from_template(sel, direction, &name)?;
                Ok(Some(format!("Added '{}' on {} side", name, direction)))
            }
            EditorAction::Save => self.save(false),
            EditorAction::SaveAs => self.save(true),
            EditorAction::Open => self.open(FilePurpose::OpenMap),
            EditorAction::LoadSavedGame => self.open(FilePurpose::OpenSavedGame),
            EditorAction::New => {
                if !self.resolve_unsaved()? {
                    return Ok(None);
                }
                self.document.clear();
                Ok(Some("New map".to_string()))
            }
        }
    }

    fn tile_id(&self, coord: Coord) -> String {
        self.document
            .tile_at(coord)
            .map_or_else(|| coord.to_string(), |t| format!("'{}'", t.tile_id))
    }

    fn edit_tile(&mut self, coord: Coord) -> Result<Option<String>, MapError> {
        self.document.config().check_bounds(coord)?;
        let mut settings = match self.document.tile_at(coord) {
            Some(tile) => TileSettings::from_tile(tile),
            None => TileSettings::new(&self.document.default_tile_id()),
        };
        self.edit_form(&mut settings, |doc, s| {
            doc.apply_tile(coord, &s.tile_id, s.attributes.clone())?;
            Ok(format!("Tile '{}' saved at {}", s.tile_id.trim(), coord))
        })
    }

    fn delete_tile(&mut self, coord: Coord) -> Result<Option<String>, MapError> {
        let id = self
            .document
            .tile_at(coord)
            .map(|t| t.tile_id.clone())
            .ok_or(MapError::NoTileAt(coord))?;
        if !self.ui.confirm(&Dialog::DeleteTile(id.clone())) {
            return Ok(None);
        }
        self.document.delete_tile(coord)?;
        Ok(Some(format!("Deleted tile '{}'", id)))
    }

    /// Direction preselected in a new door form: the first side with a
    /// neighbour and no door.
    fn free_side(&self, coord: Coord) -> Direction {
        Direction::ALL
            .into_iter()
            .find(|dir| {
                self.document.grid().is_occupied(coord.step(*dir))
                    && self.document.door(coord, *dir).is_none()
            })
            .unwrap_or(Direction::North)
    }

    fn add_door(&mut self, coord: Coord, keypad: bool) -> Result<Option<String>, MapError> {
        if self.document.tile_at(coord).is_none() {
            return Err(MapError::NoTileAt(coord));
        }
        let dir = self.free_side(coord);
        let id = self.document.default_door_id();
        if keypad {
            let mut settings = KeypadDoorSettings::new(dir, &id);
            self.edit_form(&mut settings, move |doc, s| {
                doc.add_door(coord, s.direction(), s.to_door())?;
                Ok(door_status("Added", &s.to_door(), s.direction()))
            })
        } else {
            let mut settings = DoorSettings::new(dir, &id);
            self.edit_form(&mut settings, move |doc, s| {
                doc.add_door(coord, s.direction, s.to_door())?;
                Ok(door_status("Added", &s.to_door(), s.direction))
            })
        }
    }

    fn edit_door(&mut self, coord: Coord, dir: Direction) -> Result<Option<String>, MapError> {
        let door = self
            .document
            .door(coord, dir)
            .cloned()
            .ok_or_else(|| MapError::NoDoor {
                tile_id: self
                    .document
                    .tile_at(coord)
                    .map(|t| t.tile_id.clone())
                    .unwrap_or_default(),
                direction: dir,
            })?;
        let same_side = move |chosen: Direction| {
            if chosen == dir {
                Ok(())
            } else {
                Err(MapError::InvalidField {
                    field: "direction".to_string(),
                    reason: "an existing door cannot change sides".to_string(),
                })
            }
        };
        if door.is_keypad() {
            let mut settings = KeypadDoorSettings::from_door(dir, &door);
            self.edit_form(&mut settings, move |doc, s| {
                same_side(s.direction())?;
                doc.update_door(coord, dir, s.to_door())?;
                Ok(door_status("Updated", &s.to_door(), dir))
            })
        } else {
            let mut settings = DoorSettings::from_door(dir, &door);
            self.edit_form(&mut settings, move |doc, s| {
                same_side(s.direction)?;
                doc.update_door(coord, dir, s.to_door())?;
                Ok(door_status("Updated", &s.to_door(), dir))
            })
        }
    }

    fn edit_walls(&mut self, coord: Coord) -> Result<Option<String>, MapError> {
        let mut settings = WallSettings::from(self.document.walls(coord)?);
        self.edit_form(&mut settings, |doc, s| {
            doc.set_walls(coord, s.to_array())?;
            Ok(format!("Walls updated at {}", coord))
        })
    }

    /// Offers to save unsaved changes. `false` means the user backed out.
    fn resolve_unsaved(&mut self) -> Result<bool, MapError> {
        if !self.document.is_dirty() {
            return Ok(true);
        }
        match self.ui.save_changes() {
            DialogResult::Save => Ok(self.save(false)?.is_some()),
            DialogResult::DontSave => Ok(true),
            DialogResult::Cancel => Ok(false),
        }
    }

    fn save(&mut self, ask_path: bool) -> Result<Option<String>, MapError> {
        if self.document.start_tile().is_none() {
            return Err(MapError::NoStartTile);
        }
        let path: PathBuf = match self.document.loaded_path() {
            Some(path) if !ask_path => path.to_path_buf(),
            _ => match self.ui.pick_file(FilePurpose::SaveMap) {
                Some(path) => path,
                None => return Ok(None),
            },
        };
        self.document.save(&path)?;
        Ok(Some(format!("Saved {}", path.display())))
    }

    fn open(&mut self, purpose: FilePurpose) -> Result<Option<String>, MapError> {
        if !self.resolve_unsaved()? {
            return Ok(None);
        }
        let Some(path) = self.ui.pick_file(purpose) else {
            return Ok(None);
        };
        if purpose == FilePurpose::OpenSavedGame {
            self.document.load_saved_game(&path)?;
        } else {
            self.document.load(&path)?;
        }
        Ok(Some(format!("Loaded {}", path.display())))
    }
}

fn door_status(verb: &str, door: &Door, dir: Direction) -> String {
    format!("{} {} '{}' on {} side", verb, door.type_name(), door.tile_id.trim(), dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::map::{Link, TileAttributes};
    use crate::ui::{ScriptedUi, UiEvent};

    fn editor() -> Editor<ScriptedUi> {
        Editor::new(MapDocument::new(EditorConfig::default()), ScriptedUi::new())
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Str(s.to_string())
    }

    fn place(editor: &mut Editor<ScriptedUi>, row: i32, col: i32, id: &str) {
        editor
            .document_mut()
            .place_tile(Coord::new(row, col), id, TileAttributes::default())
            .unwrap();
    }

    #[test]
    fn test_new_tile_form_uses_default_id() {
        let mut ed = editor();
        ed.ui_mut().accept_form(&[("name", text("Kitchen"))]);
        assert!(ed.double_click(Coord::new(1, 1)));

        let tile = ed.document().tile_at(Coord::new(1, 1)).unwrap();
        assert_eq!(tile.tile_id, "tile1");
        assert_eq!(tile.attributes.name, "Kitchen");
        assert!(ed.status_message.contains("tile1"));
    }

    #[test]
    fn test_rejected_form_is_shown_again() {
        let mut ed = editor();
        place(&mut ed, 0, 0, "A");
        ed.ui_mut()
            .accept_form(&[("tile_id", text("A"))])
            .accept_form(&[("tile_id", text("   "))])
            .accept_form(&[("tile_id", text("B"))]);
        assert!(ed.double_click(Coord::new(0, 1)));

        assert_eq!(ed.document().tile_at(Coord::new(0, 1)).unwrap().tile_id, "B");
        assert_eq!(ed.ui().errors().len(), 2);
        assert!(ed.ui().errors()[0].contains("already in use"));
    }

    #[test]
    fn test_cancelled_form_changes_nothing() {
        let mut ed = editor();
        ed.ui_mut().cancel_form();
        assert!(ed.double_click(Coord::new(0, 0)));
        assert!(ed.document().graph().is_empty());
        assert!(!ed.document().is_dirty());
    }

    #[test]
    fn test_delete_asks_first() {
        let mut ed = editor();
        place(&mut ed, 0, 0, "A");
        ed.click(Coord::new(0, 0));

        ed.ui_mut().answer(false);
        ed.execute(EditorAction::DeleteSelected);
        assert!(ed.document().tile_at(Coord::new(0, 0)).is_some());

        ed.ui_mut().answer(true);
        ed.execute(EditorAction::DeleteSelected);
        assert!(ed.document().tile_at(Coord::new(0, 0)).is_none());
        assert_eq!(
            ed.ui().events.iter().filter(|e| matches!(e, UiEvent::Confirm(_))).count(),
            2
        );
    }

    #[test]
    fn test_opposite_door_error_is_reported() {
        let mut ed = editor();
        place(&mut ed, 0, 0, "A");
        place(&mut ed, 0, 1, "B");

        ed.click(Coord::new(0, 1));
        ed.ui_mut().accept_form(&[]);
        assert!(ed.execute(EditorAction::AddDoor));
        // the form preselected B's west side, the one with a neighbour
        assert!(ed.document().door(Coord::new(0, 1), Direction::West).is_some());

        ed.click(Coord::new(0, 0));
        ed.ui_mut().accept_form(&[("direction", text("east"))]);
        // rejected, then the re-shown form is cancelled
        ed.execute(EditorAction::AddKeypadDoor);
        assert!(ed.error_message.as_deref().unwrap_or_default().contains("door1"));
        assert_eq!(ed.ui().errors().len(), 1);
        let a = ed.document().key_at(Coord::new(0, 0)).unwrap();
        let b = ed.document().key_at(Coord::new(0, 1)).unwrap();
        assert_eq!(ed.document().graph().link(a, Direction::East), Some(&Link::Direct(b)));
    }

    #[test]
    fn test_edit_door_cannot_move_it() {
        let mut ed = editor();
        place(&mut ed, 0, 0, "A");
        place(&mut ed, 1, 0, "B");
        ed.click(Coord::new(0, 0));
        ed.ui_mut().accept_form(&[("code", FieldValue::Integer(77))]);
        assert!(ed.execute(EditorAction::AddKeypadDoor));

        ed.ui_mut()
            .accept_form(&[("direction", text("west"))])
            .accept_form(&[("direction", text("south")), ("name", text("hatch"))]);
        assert!(ed.execute(EditorAction::EditDoor(Direction::South)));
        let door = ed.document().door(Coord::new(0, 0), Direction::South).unwrap();
        assert_eq!(door.name, "hatch");
        assert!(door.is_keypad());
        assert_eq!(ed.ui().errors().len(), 1);
    }

    #[test]
    fn test_walls_form() {
        let mut ed = editor();
        place(&mut ed, 0, 0, "A");
        place(&mut ed, 0, 1, "B");
        ed.click(Coord::new(0, 0));
        ed.ui_mut().accept_form(&[("east", FieldValue::Bool(true))]);
        assert!(ed.execute(EditorAction::EditWalls));
        let a = ed.document().key_at(Coord::new(0, 0)).unwrap();
        assert!(ed.document().graph().link(a, Direction::East).is_none());
    }

    #[test]
    fn test_save_without_start_fails_and_save_as_asks_for_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        let mut ed = editor();
        place(&mut ed, 0, 0, "A");
        ed.click(Coord::new(0, 0));

        assert!(!ed.execute(EditorAction::Save));
        assert!(ed.ui().errors()[0].contains("start tile"));

        ed.execute(EditorAction::SetStart);
        ed.ui_mut().give_path(Some(path.clone()));
        assert!(ed.execute(EditorAction::Save));
        assert!(path.exists());
        assert!(!ed.document().is_dirty());

        // known path now; no prompt
        let prompts = ed.ui().events.len();
        assert!(ed.execute(EditorAction::Save));
        assert_eq!(ed.ui().events.len(), prompts);
    }

    #[test]
    fn test_open_with_unsaved_changes_can_be_cancelled() {
        let mut ed = editor();
        place(&mut ed, 0, 0, "A");
        ed.ui_mut().answer_save_changes(DialogResult::Cancel);
        assert!(ed.execute(EditorAction::Open));
        assert_eq!(ed.document().graph().len(), 1);
        assert!(!ed.ui().events.iter().any(|e| matches!(e, UiEvent::PickFile(_))));

        ed.ui_mut()
            .answer_save_changes(DialogResult::DontSave)
            .give_path(Some(PathBuf::from("/nonexistent/map.json")));
        assert!(!ed.execute(EditorAction::Open));
        assert_eq!(ed.document().graph().len(), 1);
    }
}
