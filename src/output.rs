//! Command output
//!
//! The typed result of a dispatched command and how it is printed.

use std::io::{self, Write};

use crate::kv::KeyValue;

/// Confirmation printed by commands that return nothing
pub const OK: &str = "OK";

/// Result of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Write commands
    Empty,

    /// `get`
    Single(KeyValue),

    /// `seek`, in ascending key order
    Many(Vec<KeyValue>),
}

impl Output {
    /// Write the output, one line per record
    ///
    /// An empty `Many` prints nothing.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Output::Empty => writeln!(out, "{}", OK),
            Output::Single(kv) => writeln!(out, "{}", kv),
            Output::Many(kvs) => {
                for kv in kvs {
                    writeln!(out, "{}", kv)?;
                }
                Ok(())
            }
        }
    }

    /// Records carried by the output
    pub fn records(&self) -> &[KeyValue] {
        match self {
            Output::Empty => &[],
            Output::Single(kv) => std::slice::from_ref(kv),
            Output::Many(kvs) => kvs.as_slice(),
        }
    }
}
