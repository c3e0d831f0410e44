// src/terminal/mod.rs

//! Runs a game engine over a map on its own thread. Player input is queued
//! from the caller's thread; engine output comes back through a callback.

pub mod preview;

pub use preview::PreviewEngine;

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info};
use parking_lot::{Condvar, Mutex};

use crate::document::MapFile;
use crate::error::MapError;

/// Prompt written before the engine waits for a line.
pub const PROMPT: &str = "> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Tells the engine to stop waiting and return.
    Stop,
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<Input>,
    /// The engine is blocked in `pop`.
    waiting: bool,
    /// The engine thread has exited.
    closed: bool,
}

/// Blocking FIFO between the caller and the engine thread.
#[derive(Debug, Default)]
pub struct InputQueue {
    state: Mutex<QueueState>,
    changed: Condvar,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, input: Input) {
        self.state.lock().items.push_back(input);
        self.changed.notify_all();
    }

    /// Next input, blocking until there is one.
    pub fn pop(&self) -> Input {
        let mut state = self.state.lock();
        loop {
            if let Some(input) = state.items.pop_front() {
                state.waiting = false;
                return input;
            }
            if !state.waiting {
                state.waiting = true;
                self.changed.notify_all();
            }
            self.changed.wait(&mut state);
        }
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.waiting = false;
        self.changed.notify_all();
    }

    /// Blocks until every queued line is consumed and the engine is waiting
    /// for more, or has exited.
    pub fn settle(&self) {
        let mut state = self.state.lock();
        while !(state.closed || (state.waiting && state.items.is_empty())) {
            self.changed.wait(&mut state);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

/// Output sink, called on the engine thread.
pub type OutputFn = Box<dyn FnMut(&str) + Send>;

/// The engine's side of the terminal.
pub struct TerminalIo {
    queue: Arc<InputQueue>,
    output: OutputFn,
    stopped: bool,
}

impl TerminalIo {
    /// Prompts and waits for a line. `None` once the terminal is stopping.
    pub fn read_line(&mut self) -> Option<String> {
        if self.stopped {
            return None;
        }
        (self.output)(PROMPT);
        match self.queue.pop() {
            Input::Line(line) => Some(line),
            Input::Stop => {
                self.stopped = true;
                None
            }
        }
    }

    pub fn write(&mut self, text: &str) {
        (self.output)(text);
    }

    pub fn write_line(&mut self, text: &str) {
        (self.output)(&format!("{}\n", text));
    }
}

/// A game that can be played in the terminal.
pub trait GameEngine: Send + 'static {
    /// Plays until the player quits or `read_line` returns `None`.
    fn run(&mut self, io: &mut TerminalIo) -> Result<(), MapError>;
}

struct CloseOnExit(Arc<InputQueue>);

impl Drop for CloseOnExit {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Handle to a running engine thread. Dropping it stops and joins the thread.
pub struct GameTerminal {
    queue: Arc<InputQueue>,
    handle: Option<JoinHandle<()>>,
}

impl GameTerminal {
    /// Spawns `engine` on a new thread, writing its output through `output`.
    pub fn start<E, F>(mut engine: E, output: F) -> Result<Self, MapError>
    where
        E: GameEngine,
        F: FnMut(&str) + Send + 'static,
    {
        let queue = Arc::new(InputQueue::new());
        let mut io = TerminalIo {
            queue: Arc::clone(&queue),
            output: Box::new(output),
            stopped: false,
        };
        let guard = CloseOnExit(Arc::clone(&queue));

        let handle = thread::Builder::new()
            .name("game-terminal".to_string())
            .spawn(move || {
                let _guard = guard;
                info!("game engine started");
                if let Err(e) = engine.run(&mut io) {
                    error!("game engine failed: {}", e);
                    io.write_line(&format!("error: {}", e));
                }
                info!("game engine finished");
            })?;

        Ok(Self {
            queue,
            handle: Some(handle),
        })
    }

    /// Plays a copy of `map` with the built-in preview engine.
    pub fn play(map: &MapFile, output: impl FnMut(&str) + Send + 'static) -> Result<Self, MapError> {
        let json = serde_json::to_string(map)?;
        Self::start(PreviewEngine::new(json), output)
    }

    pub fn send_line(&self, line: &str) {
        self.queue.push(Input::Line(line.to_string()));
    }

    /// Waits until the engine has consumed all input and wants more, or has
    /// exited.
    pub fn settle(&self) {
        self.queue.settle();
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_closed()
    }

    /// Stops the engine and joins its thread. Safe to call more than once.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.queue.push(Input::Stop);
        if handle.join().is_err() {
            error!("game terminal thread panicked");
        }
    }
}

impl Drop for GameTerminal {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl GameEngine for Echo {
        fn run(&mut self, io: &mut TerminalIo) -> Result<(), MapError> {
            while let Some(line) = io.read_line() {
                if line == "bye" {
                    break;
                }
                io.write_line(&line.to_uppercase());
            }
            Ok(())
        }
    }

    fn collector() -> (Arc<Mutex<String>>, impl FnMut(&str) + Send + 'static) {
        let out = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&out);
        (out, move |text: &str| sink.lock().push_str(text))
    }

    #[test]
    fn test_queue_is_fifo() {
        let queue = InputQueue::new();
        queue.push(Input::Line("a".to_string()));
        queue.push(Input::Stop);
        assert_eq!(queue.pop(), Input::Line("a".to_string()));
        assert_eq!(queue.pop(), Input::Stop);
    }

    #[test]
    fn test_lines_reach_engine_in_order() {
        let (out, sink) = collector();
        let mut terminal = GameTerminal::start(Echo, sink).unwrap();
        terminal.send_line("north");
        terminal.send_line("look");
        terminal.settle();
        assert_eq!(out.lock().as_str(), "> NORTH\n> LOOK\n> ");
        terminal.shutdown();
        assert!(terminal.is_finished());
    }

    #[test]
    fn test_engine_can_finish_first() {
        let (_out, sink) = collector();
        let mut terminal = GameTerminal::start(Echo, sink).unwrap();
        terminal.send_line("bye");
        terminal.settle();
        assert!(terminal.is_finished());
        terminal.shutdown();
        terminal.shutdown();
    }

    #[test]
    fn test_drop_stops_waiting_engine() {
        let (out, sink) = collector();
        {
            let terminal = GameTerminal::start(Echo, sink).unwrap();
            terminal.settle();
        }
        assert_eq!(out.lock().as_str(), "> ");
    }
}
