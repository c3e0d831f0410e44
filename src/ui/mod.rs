// src/ui/mod.rs
pub mod ascii;
pub mod console;
pub mod dialog;
pub mod scripted;

use std::path::PathBuf;

pub use console::ConsoleUi;
pub use dialog::{Dialog, DialogResult, FilePurpose, FormOutcome};
pub use scripted::{ScriptedUi, UiEvent};

use crate::editor::forms::{FieldSpec, FormValues};

/// What the editor needs from whatever front end is driving it.
pub trait EditorUi {
    /// Shows a form for `fields`, pre-filled from `values`. On accept the
    /// user's input is left in `values`.
    fn run_form(&mut self, title: &str, fields: &[FieldSpec], values: &mut FormValues) -> FormOutcome;

    /// Yes/no question. `true` means yes.
    fn confirm(&mut self, dialog: &Dialog) -> bool;

    /// Asks whether to save before unsaved changes are discarded.
    fn save_changes(&mut self) -> DialogResult;

    fn show_error(&mut self, heading: &str, message: &str);

    /// A path to read or write, `None` if the user backed out.
    fn pick_file(&mut self, purpose: FilePurpose) -> Option<PathBuf>;
}
