//! Command definitions
//!
//! Turns a command name and its byte-string arguments into a validated
//! [`Command`]. Validation never touches the store, so a malformed line
//! cannot open a transaction.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ShellError};

/// Command names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Put,
    Puts,
    Get,
    Seek,
    Del,
}

impl CommandKind {
    pub const ALL: [CommandKind; 5] = [
        CommandKind::Put,
        CommandKind::Puts,
        CommandKind::Get,
        CommandKind::Seek,
        CommandKind::Del,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Put => "put",
            CommandKind::Puts => "puts",
            CommandKind::Get => "get",
            CommandKind::Seek => "seek",
            CommandKind::Del => "del",
        }
    }

    /// Argument synopsis, shown when the arguments are wrong
    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::Put => "put [key] [value]",
            CommandKind::Puts => "puts [key1] [value1] [key2] [value2] ... [key N] [value N]",
            CommandKind::Get => "get [key]",
            CommandKind::Seek => "seek [start key] [limit]",
            CommandKind::Del => "del [key 1] ... [key N]",
        }
    }

    /// Whether the command writes to the store
    pub fn is_mutating(self) -> bool {
        matches!(self, CommandKind::Put | CommandKind::Puts | CommandKind::Del)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive lookup by name
impl FromStr for CommandKind {
    type Err = ShellError;

    fn from_str(name: &str) -> Result<Self> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ShellError::UnknownCommand(name.to_string()))
    }
}

/// A validated command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set one key
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Set many keys in one transaction
    Puts { pairs: Vec<(Vec<u8>, Vec<u8>)> },

    /// Read one key
    Get { key: Vec<u8> },

    /// Read up to `limit` pairs starting at the first key >= `start`
    Seek { start: Vec<u8>, limit: usize },

    /// Delete keys in one transaction
    Del { keys: Vec<Vec<u8>> },
}

impl Command {
    /// Validate arguments for the named command
    pub fn parse(name: &str, args: Vec<Vec<u8>>) -> Result<Self> {
        let kind: CommandKind = name.parse()?;
        let usage = || ShellError::Argument(kind.usage().to_string());

        match kind {
            CommandKind::Put => {
                let [key, value]: [Vec<u8>; 2] = args.try_into().map_err(|_| usage())?;
                Ok(Command::Put { key, value })
            }
            CommandKind::Puts => {
                if args.is_empty() || args.len() % 2 != 0 {
                    return Err(usage());
                }
                let mut pairs = Vec::with_capacity(args.len() / 2);
                let mut args = args.into_iter();
                while let (Some(key), Some(value)) = (args.next(), args.next()) {
                    pairs.push((key, value));
                }
                Ok(Command::Puts { pairs })
            }
            CommandKind::Get => {
                let [key]: [Vec<u8>; 1] = args.try_into().map_err(|_| usage())?;
                Ok(Command::Get { key })
            }
            CommandKind::Seek => {
                let [start, limit]: [Vec<u8>; 2] = args.try_into().map_err(|_| usage())?;
                let limit = parse_limit(&limit)?;
                Ok(Command::Seek { start, limit })
            }
            CommandKind::Del => {
                if args.is_empty() {
                    return Err(usage());
                }
                Ok(Command::Del { keys: args })
            }
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Put { .. } => CommandKind::Put,
            Command::Puts { .. } => CommandKind::Puts,
            Command::Get { .. } => CommandKind::Get,
            Command::Seek { .. } => CommandKind::Seek,
            Command::Del { .. } => CommandKind::Del,
        }
    }
}

fn parse_limit(raw: &[u8]) -> Result<usize> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| {
            ShellError::Argument(format!(
                "invalid limit {:?}: expected a non-negative integer",
                String::from_utf8_lossy(raw)
            ))
        })
}

/// Split a line into a lower-cased command name and byte-string arguments
///
/// Returns `None` for a line with no fields.
pub fn tokenize(line: &str) -> Option<(String, Vec<Vec<u8>>)> {
    let mut fields = line.split_whitespace();
    let name = fields.next()?.to_lowercase();
    let args = fields.map(|field| field.as_bytes().to_vec()).collect();
    Some((name, args))
}
