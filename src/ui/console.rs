// src/ui/console.rs

use std::io::{BufRead, Write};
use std::path::PathBuf;

use log::warn;

use super::dialog::{Dialog, DialogResult, FilePurpose, FormOutcome};
use super::EditorUi;
use crate::editor::forms::{FieldKind, FieldSpec, FormValues};

/// Typed at any form prompt to abandon the form.
pub const CANCEL: &str = "!cancel";

/// Line-oriented front end: forms are filled one field per line, an empty
/// line keeps the shown value.
pub struct ConsoleUi<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleUi<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: &str) {
        if let Err(e) = writeln!(self.output, "{}", text) {
            warn!("console write failed: {}", e);
        }
    }

    /// Prints `prompt` and reads one line without its line ending. `None` at
    /// end of input.
    pub fn read_line(&mut self, prompt: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{}", prompt).and_then(|_| self.output.flush()) {
            warn!("console write failed: {}", e);
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                warn!("console read failed: {}", e);
                None
            }
        }
    }

    fn ask_yes_no(&mut self, question: &str) -> bool {
        matches!(
            self.read_line(&format!("{} [y/N] ", question))
                .map(|a| a.trim().to_ascii_lowercase())
                .as_deref(),
            Some("y" | "yes")
        )
    }
}

fn describe(kind: FieldKind) -> String {
    match kind {
        FieldKind::Choice(choices) => format!(" ({})", choices.join("/")),
        FieldKind::Bool => " (y/n)".to_string(),
        _ => String::new(),
    }
}

impl<R: BufRead, W: Write> EditorUi for ConsoleUi<R, W> {
    fn run_form(&mut self, title: &str, fields: &[FieldSpec], values: &mut FormValues) -> FormOutcome {
        self.say(&format!("== {} == (empty keeps value, {} aborts)", title, CANCEL));
        for field in fields {
            let current = values.get(field.name).map(|v| v.to_string()).unwrap_or_default();
            loop {
                let prompt = format!("{}{} [{}]: ", field.label, describe(field.kind), current);
                let Some(line) = self.read_line(&prompt) else {
                    return FormOutcome::Cancelled;
                };
                if line.trim() == CANCEL {
                    return FormOutcome::Cancelled;
                }
                if line.is_empty() {
                    break;
                }
                match field.parse(&line) {
                    Ok(value) => {
                        values.set(field.name, value);
                        break;
                    }
                    Err(e) => self.say(&e.to_string()),
                }
            }
        }
        FormOutcome::Accepted
    }

    fn confirm(&mut self, dialog: &Dialog) -> bool {
        self.ask_yes_no(&format!("{}: {}", dialog.title(), dialog.message()))
    }

    fn save_changes(&mut self) -> DialogResult {
        let dialog = Dialog::SaveChanges;
        let question = format!("{}: {} [s]ave/[d]on't save/[c]ancel ", dialog.title(), dialog.message());
        match self.read_line(&question).map(|a| a.trim().to_ascii_lowercase()).as_deref() {
            Some("s" | "save") => DialogResult::Save,
            Some("d" | "don't save" | "dont save") => DialogResult::DontSave,
            _ => DialogResult::Cancel,
        }
    }

    fn show_error(&mut self, heading: &str, message: &str) {
        self.say(&format!("{}: {}", heading, message));
    }

    fn pick_file(&mut self, purpose: FilePurpose) -> Option<PathBuf> {
        let line = self.read_line(&format!("{}: ", purpose.title()))?;
        let line = line.trim();
        if line.is_empty() {
            None
        } else {
            Some(PathBuf::from(line))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::editor::forms::{Editable, FieldValue, WallSettings};

    fn console(input: &str) -> ConsoleUi<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleUi::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_form_keeps_blank_fields_and_retries_bad_input() {
        let walls = WallSettings::default();
        let mut values = walls.values();
        let mut ui = console("maybe\ny\n\n\nyes\n");

        let outcome = ui.run_form(walls.title(), walls.fields(), &mut values);
        assert_eq!(outcome, FormOutcome::Accepted);
        assert_eq!(values.get("north"), Some(&FieldValue::Bool(true)));
        assert_eq!(values.get("south"), Some(&FieldValue::Bool(false)));
        assert_eq!(values.get("west"), Some(&FieldValue::Bool(true)));

        let shown = String::from_utf8(ui.output).unwrap();
        assert!(shown.contains("expected yes or no"));
    }

    #[test]
    fn test_cancel_and_end_of_input() {
        let walls = WallSettings::default();
        let mut values = walls.values();
        assert_eq!(
            console("!cancel\n").run_form("Walls", walls.fields(), &mut values),
            FormOutcome::Cancelled
        );
        assert_eq!(console("").run_form("Walls", walls.fields(), &mut values), FormOutcome::Cancelled);
        assert!(!console("").confirm(&Dialog::SaveChanges));
        assert_eq!(console("d\n").save_changes(), DialogResult::DontSave);
        assert_eq!(console(" \n").pick_file(FilePurpose::OpenMap), None);
        assert_eq!(
            console("maps/castle.json\n").pick_file(FilePurpose::OpenMap),
            Some(PathBuf::from("maps/castle.json"))
        );
    }
}
