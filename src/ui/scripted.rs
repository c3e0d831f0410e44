// src/ui/scripted.rs

use std::collections::VecDeque;
use std::path::PathBuf;

use super::dialog::{Dialog, DialogResult, FilePurpose, FormOutcome};
use super::EditorUi;
use crate::editor::forms::{FieldSpec, FieldValue, FormValues};

/// Something the editor asked of the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Form(String),
    Confirm(Dialog),
    SaveChanges,
    Error { heading: String, message: String },
    PickFile(FilePurpose),
}

/// Front end that replays queued answers, for batch runs and tests. Once a
/// queue runs dry every request is declined.
#[derive(Debug, Default)]
pub struct ScriptedUi {
    forms: VecDeque<Option<Vec<(String, FieldValue)>>>,
    answers: VecDeque<bool>,
    save_answers: VecDeque<DialogResult>,
    paths: VecDeque<Option<PathBuf>>,
    pub events: Vec<UiEvent>,
}

impl ScriptedUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the next form after overwriting the given fields.
    pub fn accept_form(&mut self, changes: &[(&str, FieldValue)]) -> &mut Self {
        let changes = changes
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        self.forms.push_back(Some(changes));
        self
    }

    pub fn cancel_form(&mut self) -> &mut Self {
        self.forms.push_back(None);
        self
    }

    pub fn answer(&mut self, yes: bool) -> &mut Self {
        self.answers.push_back(yes);
        self
    }

    pub fn answer_save_changes(&mut self, result: DialogResult) -> &mut Self {
        self.save_answers.push_back(result);
        self
    }

    pub fn give_path(&mut self, path: Option<PathBuf>) -> &mut Self {
        self.paths.push_back(path);
        self
    }

    /// Messages of every error shown so far.
    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                UiEvent::Error { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl EditorUi for ScriptedUi {
    fn run_form(&mut self, title: &str, _fields: &[FieldSpec], values: &mut FormValues) -> FormOutcome {
        self.events.push(UiEvent::Form(title.to_string()));
        match self.forms.pop_front().flatten() {
            Some(changes) => {
                for (name, value) in changes {
                    values.set(&name, value);
                }
                FormOutcome::Accepted
            }
            None => FormOutcome::Cancelled,
        }
    }

    fn confirm(&mut self, dialog: &Dialog) -> bool {
        self.events.push(UiEvent::Confirm(dialog.clone()));
        self.answers.pop_front().unwrap_or(false)
    }

    fn save_changes(&mut self) -> DialogResult {
        self.events.push(UiEvent::SaveChanges);
        self.save_answers.pop_front().unwrap_or(DialogResult::Cancel)
    }

    fn show_error(&mut self, heading: &str, message: &str) {
        self.events.push(UiEvent::Error {
            heading: heading.to_string(),
            message: message.to_string(),
        });
    }

    fn pick_file(&mut self, purpose: FilePurpose) -> Option<PathBuf> {
        self.events.push(UiEvent::PickFile(purpose));
        self.paths.pop_front().flatten()
    }
}
