//! Global CLI options shared across all commands
//!
//! Collects the global flags into one struct so handlers take a single
//! parameter instead of one per flag.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.animetrack/config.yaml)
    pub config: Option<String>,

    /// AniList endpoint override
    pub api_url: Option<String>,

    /// Data directory override
    pub data_dir: Option<String>,

    /// Skip fresh cache entries and always ask the API first
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_url: cli.api_url.clone(),
            data_dir: cli.data_dir.clone(),
            no_cache: cli.no_cache,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get API URL override as `Option<&str>`.
    pub fn api_url_ref(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    /// Get data directory override as `Option<&str>`.
    pub fn data_dir_ref(&self) -> Option<&str> {
        self.data_dir.as_deref()
    }
}
