// src/ui/dialog.rs

/// Prompts the editor raises before acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    /// Unsaved changes would be lost.
    SaveChanges,
    /// Deleting the named tile.
    DeleteTile(String),
}

impl Dialog {
    pub fn title(&self) -> &'static str {
        match self {
            Dialog::SaveChanges => "Unsaved Changes",
            Dialog::DeleteTile(_) => "Delete tile",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Dialog::SaveChanges => {
                "You have unsaved changes. Do you want to save before continuing?".to_string()
            }
            Dialog::DeleteTile(id) => format!("Are you sure you want to delete tile '{}'?", id),
        }
    }
}

/// Answer to the unsaved-changes prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResult {
    Save,
    DontSave,
    Cancel,
}

/// How a form was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Accepted,
    Cancelled,
}

/// What a picked path will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePurpose {
    OpenMap,
    SaveMap,
    OpenSavedGame,
}

impl FilePurpose {
    pub fn title(self) -> &'static str {
        match self {
            FilePurpose::OpenMap => "Open map file",
            FilePurpose::SaveMap => "Save map file",
            FilePurpose::OpenSavedGame => "Load saved game file",
        }
    }
}
