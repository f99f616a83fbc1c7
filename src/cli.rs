//! Command-line arguments
//!
//! The shell takes a single option, the placement driver address, written
//! Go-style as `-pd <addr>`. Arguments are normalised before clap sees them:
//! `-pd` becomes `--pd`, and a non-empty `PD_ADDR` environment variable is
//! appended as one more `--pd`. The last occurrence wins, so the variable
//! overrides the flag.

use clap::Parser;

use crate::config::{parse_pd_endpoints, Config, DEFAULT_PD_ADDR};
use crate::error::Result;

/// Environment variable carrying a pd address
pub const PD_ADDR_ENV: &str = "PD_ADDR";

/// tikv-shell
#[derive(Parser, Debug)]
#[command(name = "tikv-shell")]
#[command(about = "Interactive shell for transactional key-value commands against TiKV")]
#[command(version)]
#[command(args_override_self = true)]
pub struct Args {
    /// pd address (host:port, comma-separated for several)
    #[arg(long = "pd", value_name = "ADDRESS", default_value = DEFAULT_PD_ADDR)]
    pub pd: String,
}

impl Args {
    /// Parse process arguments, honouring `-pd` and `PD_ADDR`
    pub fn from_env() -> Self {
        let env_pd = std::env::var(PD_ADDR_ENV).ok();
        Self::parse_from(normalize_args(std::env::args(), env_pd))
    }

    /// Build the session configuration
    pub fn into_config(self) -> Result<Config> {
        let endpoints = parse_pd_endpoints(&self.pd)?;
        Ok(Config::builder().pd_endpoints(endpoints).build())
    }
}

/// Rewrite `-pd` spellings to `--pd` and append the environment override
pub fn normalize_args<I>(args: I, env_pd: Option<String>) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut normalized: Vec<String> = args
        .into_iter()
        .map(|arg| {
            if arg == "-pd" {
                "--pd".to_string()
            } else if let Some(value) = arg.strip_prefix("-pd=") {
                format!("--pd={}", value)
            } else {
                arg
            }
        })
        .collect();

    if let Some(addr) = env_pd.filter(|addr| !addr.is_empty()) {
        normalized.push("--pd".to_string());
        normalized.push(addr);
    }

    normalized
}
