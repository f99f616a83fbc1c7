//! # tikv-shell
//!
//! An interactive shell for ad-hoc key-value commands against a
//! transactional key-value store:
//! - `put`, `puts`, `get`, `seek`, `del`, each in its own transaction
//! - Line editing with persistent history
//! - Exit on `exit`, end of input, or a termination signal
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Interactive Loop                          │
//! │            (rustyline, one line at a time)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ name + byte-string args
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Dispatcher                              │
//! │        (validate → one transaction per command)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  TikvStore  │          │ MemoryStore │
//!   │  (cluster)  │          │   (tests)   │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! A signal listener task runs beside the loop and terminates the process
//! on HUP, INT, TERM or QUIT.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod cli;

pub mod kv;
pub mod store;
pub mod scanner;
pub mod command;
pub mod output;
pub mod dispatch;
pub mod repl;
pub mod signal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, Result, ShellError};
pub use config::Config;
pub use command::Command;
pub use dispatch::Dispatcher;
pub use kv::KeyValue;
pub use output::Output;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tikv-shell
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
