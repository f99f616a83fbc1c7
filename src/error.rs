//! Error types for tikv-shell
//!
//! Provides a unified error type for every shell operation.

use bstr::BStr;
use thiserror::Error;

/// Result type alias using ShellError
pub type Result<T> = std::result::Result<T, ShellError>;

/// Unified error type for shell operations
#[derive(Debug, Error)]
pub enum ShellError {
    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    /// Wrong arity or malformed argument; carries the message shown to the user
    #[error("{0}")]
    Argument(String),

    #[error("usage: put | puts | get | seek | del")]
    UnknownCommand(String),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("key not found: {}", BStr::new(.0))]
    KeyNotFound(Vec<u8>),

    #[error("store error: {0}")]
    Store(String),

    #[error("tikv error: {0}")]
    Tikv(#[from] tikv_client::Error),

    // -------------------------------------------------------------------------
    // Terminal / I/O Errors
    // -------------------------------------------------------------------------
    #[error("readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`ShellError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arity or malformed argument
    Argument,
    /// Unrecognized command name
    Usage,
    /// Any failure reported by the store, including a missing key
    Store,
    /// Terminal, output or configuration failure
    Fatal,
}

impl ShellError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::Argument(_) => ErrorKind::Argument,
            ShellError::UnknownCommand(_) => ErrorKind::Usage,
            ShellError::KeyNotFound(_) | ShellError::Store(_) | ShellError::Tikv(_) => {
                ErrorKind::Store
            }
            ShellError::Readline(_) | ShellError::Io(_) | ShellError::Config(_) => {
                ErrorKind::Fatal
            }
        }
    }

    /// True when the error came from the store rather than the shell
    pub fn is_store_error(&self) -> bool {
        self.kind() == ErrorKind::Store
    }
}
