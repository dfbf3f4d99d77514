//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod context;
pub mod settings;
pub mod status;
pub mod watchlist;

pub use args::{
    CatalogFilterArgs, EntryFields, GlobalOptions, ListFilterArgs, OutputFormat, SeasonArg,
    SortArg, StatusFilter,
};
pub use context::CommandContext;

use crate::watchlist::WatchStatus;

/// animetrack - Track the anime you watch, with AniList discovery
#[derive(Parser, Debug)]
#[command(name = "animetrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "ANIMETRACK_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "ANIMETRACK_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the AniList GraphQL endpoint
    #[arg(long, global = true, env = "ANIMETRACK_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Override the data directory (watchlist and cache)
    #[arg(long, global = true, env = "ANIMETRACK_DATA_DIR", hide_env = true)]
    pub data_dir: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "ANIMETRACK_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Skip cached responses and ask AniList first
    #[arg(long, global = true, env = "ANIMETRACK_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tracked anime
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        filters: ListFilterArgs,
    },

    /// Add an anime to the watchlist
    Add {
        /// Title
        title: String,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Edit a tracked anime
    Edit {
        /// Entry ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Mark episodes as watched
    Watch {
        /// Entry ID
        id: String,

        /// Number of episodes
        #[arg(long, short = 'e', default_value_t = 1)]
        episodes: u32,
    },

    /// Update several entries at once
    Batch {
        /// Entry IDs
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        ids: Vec<String>,

        /// New status for every entry
        #[arg(long)]
        status: Option<WatchStatus>,

        /// Episodes to add to every entry
        #[arg(long, default_value_t = 0)]
        increment: u32,
    },

    /// Remove an entry
    #[command(visible_alias = "rm")]
    Remove {
        /// Entry ID
        id: String,
    },

    /// Remove every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show watchlist statistics
    Stats,

    /// Merge entries from an exported JSON file
    Import {
        /// JSON file to read
        file: String,
    },

    /// Export the watchlist as JSON
    Export {
        /// Output file (stdout if omitted)
        file: Option<String>,
    },

    /// Fill in cover art and details for an entry from AniList
    Cover {
        /// Entry ID
        id: String,
    },

    /// Browse trending, popular, new and top-rated anime
    Discover {
        #[command(flatten)]
        filters: CatalogFilterArgs,

        /// Refresh every N seconds until interrupted
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Search AniList by title
    Search {
        /// Search text
        text: String,

        #[command(flatten)]
        filters: CatalogFilterArgs,

        /// Add the Nth result (1-based) to the watchlist as planned
        #[arg(long, value_name = "N")]
        add: Option<usize>,
    },

    /// View or change tracker settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Manage the local response cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Show configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Show data, cache, and configuration status
    Status,

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   animetrack completion bash > /etc/bash_completion.d/animetrack
  zsh:    animetrack completion zsh > \"${fpath[1]}/_animetrack\"
  fish:   animetrack completion fish > ~/.config/fish/completions/animetrack.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Tracker settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Change settings
    Set {
        /// Episode count for new entries
        #[arg(long)]
        default_episodes: Option<u32>,

        /// Minutes per episode
        #[arg(long)]
        episode_duration: Option<u32>,
    },
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,

    /// Remove cached responses
    Clear {
        /// Only remove keys with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Remove expired responses
    Sweep,

    /// Print the store location
    Path,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}
