//! Interactive Loop
//!
//! Reads lines, hands them to the dispatcher and prints what comes back.
//!
//! ## Per Line
//! 1. Interrupt or end-of-input ends the loop
//! 2. Other read failures are logged and skipped
//! 3. `exit` ends the loop immediately
//! 4. Blank lines are skipped
//! 5. Anything else is tokenized and dispatched; errors are printed and the
//!    loop carries on
//!
//! The loop is synchronous. Each command is driven to completion on the
//! runtime handle before the next line is read.

use std::io::Write;
use std::path::{Path, PathBuf};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Handle;

use crate::command::tokenize;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::store::Store;

/// Line that terminates the shell
pub const EXIT_COMMAND: &str = "exit";

/// What a single read produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadEvent {
    Line(String),
    /// Ctrl-C at the prompt
    Interrupted,
    /// Ctrl-D or end of input
    Eof,
}

/// Source of input lines
pub trait LineSource {
    /// Read the next line, showing `prompt`
    fn read_line(&mut self, prompt: &str) -> Result<ReadEvent>;
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The user typed `exit`
    Command,
    Interrupted,
    Eof,
}

/// Read-eval-print loop over a dispatcher
pub struct Repl<'a, S: Store> {
    dispatcher: &'a Dispatcher<S>,
    runtime: Handle,
    prompt: String,
}

impl<'a, S: Store> Repl<'a, S> {
    pub fn new(dispatcher: &'a Dispatcher<S>, runtime: Handle, prompt: impl Into<String>) -> Self {
        Self {
            dispatcher,
            runtime,
            prompt: prompt.into(),
        }
    }

    /// Run until the user exits or input ends
    ///
    /// Only a failure to write to `out` is returned as an error.
    pub fn run<L: LineSource, W: Write>(&self, source: &mut L, out: &mut W) -> Result<Exit> {
        loop {
            let line = match source.read_line(&self.prompt) {
                Ok(ReadEvent::Line(line)) => line,
                Ok(ReadEvent::Interrupted) => return Ok(Exit::Interrupted),
                Ok(ReadEvent::Eof) => return Ok(Exit::Eof),
                Err(e) => {
                    tracing::warn!("Failed to read line: {}", e);
                    continue;
                }
            };

            if line.trim() == EXIT_COMMAND {
                return Ok(Exit::Command);
            }

            self.eval(&line, out)?;
            out.flush()?;
        }
    }

    /// Dispatch one line and print the outcome
    pub fn eval<W: Write>(&self, line: &str, out: &mut W) -> Result<()> {
        let Some((name, args)) = tokenize(line) else {
            return Ok(());
        };

        match self.runtime.block_on(self.dispatcher.dispatch(&name, args)) {
            Ok(output) => output.render(out)?,
            Err(e) => writeln!(out, "{}", e)?,
        }
        Ok(())
    }
}

// =============================================================================
// Terminal Line Source
// =============================================================================

/// Terminal line editor with persistent history
pub struct LineEditor {
    editor: DefaultEditor,
    history_file: PathBuf,
}

impl LineEditor {
    /// Open the editor and load history from the configured file
    pub fn open(config: &Config) -> Result<Self> {
        let rl_config = rustyline::Config::builder()
            .auto_add_history(true)
            .build();
        let mut editor = DefaultEditor::with_config(rl_config)?;

        if let Err(e) = editor.load_history(&config.history_file) {
            tracing::debug!(
                "No history loaded from {}: {}",
                config.history_file.display(),
                e
            );
        }

        Ok(Self {
            editor,
            history_file: config.history_file.clone(),
        })
    }

    pub fn history_file(&self) -> &Path {
        &self.history_file
    }
}

impl LineSource for LineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadEvent> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                // Saved per line: `exit` and signals end the process
                // without running any teardown.
                if let Err(e) = self.editor.save_history(&self.history_file) {
                    tracing::debug!(
                        "Failed to save history to {}: {}",
                        self.history_file.display(),
                        e
                    );
                }
                Ok(ReadEvent::Line(line))
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                Ok(ReadEvent::Interrupted)
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                Ok(ReadEvent::Eof)
            }
            Err(e) => Err(e.into()),
        }
    }
}
