//! Configuration for tikv-shell
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, ShellError};

/// Default placement driver address
pub const DEFAULT_PD_ADDR: &str = "localhost:2379";

/// Default location of the interactive history file
pub const DEFAULT_HISTORY_FILE: &str = "/tmp/readline.tmp";

/// Default prompt shown by the interactive loop
pub const DEFAULT_PROMPT: &str = "tikv> ";

/// Default number of pairs fetched per scanner page
pub const DEFAULT_SCAN_BATCH_SIZE: u32 = 256;

/// Scheme prefix accepted in front of a pd address
const TIKV_SCHEME: &str = "tikv://";

/// Main configuration for a shell session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Cluster Configuration
    // -------------------------------------------------------------------------
    /// Placement driver endpoints (host:port)
    pub pd_endpoints: Vec<String>,

    // -------------------------------------------------------------------------
    // Terminal Configuration
    // -------------------------------------------------------------------------
    /// File the line editor loads history from and saves it to
    pub history_file: PathBuf,

    /// Prompt printed before every line
    pub prompt: String,

    // -------------------------------------------------------------------------
    // Scan Configuration
    // -------------------------------------------------------------------------
    /// Pairs requested from the store per scanner page
    pub scan_batch_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pd_endpoints: vec![DEFAULT_PD_ADDR.to_string()],
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            prompt: DEFAULT_PROMPT.to_string(),
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Split a pd address into endpoints
///
/// Accepts a comma-separated list, optionally prefixed with `tikv://`.
pub fn parse_pd_endpoints(addr: &str) -> Result<Vec<String>> {
    let addr = addr.trim();
    let addr = addr.strip_prefix(TIKV_SCHEME).unwrap_or(addr);

    let endpoints: Vec<String> = addr
        .split(',')
        .map(str::trim)
        .filter(|endpoint| !endpoint.is_empty())
        .map(str::to_string)
        .collect();

    if endpoints.is_empty() {
        return Err(ShellError::Config(format!(
            "no pd endpoint in address {:?}",
            addr
        )));
    }

    Ok(endpoints)
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the placement driver endpoints
    pub fn pd_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.pd_endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    /// Set the history file path
    pub fn history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.history_file = path.into();
        self
    }

    /// Set the prompt
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = prompt.into();
        self
    }

    /// Set the scanner page size (clamped to at least 1)
    pub fn scan_batch_size(mut self, size: u32) -> Self {
        self.config.scan_batch_size = size.max(1);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
