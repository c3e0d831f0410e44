// src/main.rs

//! # tgmap
//!
//! Command line front end for the map editor core: show a map as text,
//! import an engine saved game, edit a map line by line, or play it in the
//! preview terminal.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};

use tgmap::config::EditorConfig;
use tgmap::document::MapDocument;
use tgmap::editor::{Editor, EditorAction};
use tgmap::terminal::GameTerminal;
use tgmap::ui::{ascii, ConsoleUi};

#[derive(Parser)]
#[command(name = "tgmap")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TGMAP_GIT_REV"), ")"))]
#[command(about = "Grid map editor for text-adventure tile maps")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Editor settings (JSON); defaults are used when omitted
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a map file as a text grid
    Show {
        file: PathBuf,

        /// The file is an engine saved game, not a map file
        #[arg(long)]
        saved_game: bool,
    },

    /// Convert an engine saved game into a map file
    Import {
        save: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Play a map in the preview terminal
    Play { map: PathBuf },

    /// Edit a map interactively
    Edit { map: Option<PathBuf> },
}

fn load_document(config: EditorConfig, path: &Path, saved_game: bool) -> Result<MapDocument, Box<dyn Error>> {
    let mut doc = MapDocument::new(config);
    if saved_game {
        doc.load_saved_game(path)?;
    } else {
        doc.load(path)?;
    }
    Ok(doc)
}

fn show(doc: &MapDocument) {
    print!("{}", ascii::render(doc));
    println!("{}", ascii::summary(doc));
}

fn play(config: EditorConfig, path: &Path) -> Result<(), Box<dyn Error>> {
    let doc = load_document(config, path, false)?;
    let map = doc.to_map_file()?;
    let mut terminal = GameTerminal::play(&map, |text: &str| {
        print!("{}", text);
        if let Err(e) = io::stdout().flush() {
            warn!("stdout flush failed: {}", e);
        }
    })?;

    let mut lines = io::stdin().lock().lines();
    loop {
        terminal.settle();
        if terminal.is_finished() {
            break;
        }
        match lines.next() {
            Some(line) => terminal.send_line(&line?),
            None => break,
        }
    }
    terminal.shutdown();
    println!();
    Ok(())
}

fn edit(config: EditorConfig, path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let doc = match path {
        Some(path) => load_document(config, path, false)?,
        None => MapDocument::new(config),
    };
    let ui = ConsoleUi::new(io::stdin().lock(), io::stdout());
    let mut editor = Editor::new(doc, ui);

    editor.ui_mut().say("Type 'help' for commands, 'quit' to leave.");
    loop {
        let Some(line) = editor.ui_mut().read_line("tgmap> ") else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                editor.ui_mut().say(EditorAction::help());
                editor.ui_mut().say("show | help | quit");
                continue;
            }
            "show" => {
                let picture = ascii::render(editor.document());
                let summary = ascii::summary(editor.document());
                editor.ui_mut().say(picture.trim_end());
                editor.ui_mut().say(&summary);
                continue;
            }
            _ => {}
        }
        match line.parse::<EditorAction>() {
            Ok(action) => {
                if editor.execute(action) {
                    let status = editor.status_message.clone();
                    editor.ui_mut().say(&status);
                }
            }
            Err(e) => editor.ui_mut().say(&format!("{} (try 'help')", e)),
        }
    }

    if editor.document().is_dirty() {
        editor.ui_mut().say("Unsaved changes were discarded.");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = EditorConfig::load_or_default(cli.config.as_deref())?;
    info!("tgmap {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Show { file, saved_game } => {
            let doc = load_document(config, &file, saved_game)?;
            show(&doc);
        }
        Command::Import { save, output } => {
            let mut doc = load_document(config, &save, true)?;
            doc.save(&output)?;
            show(&doc);
            info!("wrote {}", output.display());
        }
        Command::Play { map } => play(config, &map)?,
        Command::Edit { map } => edit(config, map.as_deref())?,
    }
    Ok(())
}
