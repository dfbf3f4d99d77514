//! Common CLI types shared across commands

use crate::client::Season;
use crate::watchlist::{SortOrder, WatchStatus};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting
    #[default]
    Pretty,
    /// Table format - machine-parseable, one row per entry
    Table,
    /// JSON format - structured for scripts/APIs
    Json,
}

/// Watchlist sort order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortArg {
    /// Newest first
    #[default]
    Created,
    /// Title A-Z
    Alpha,
    /// Most progress first
    Progress,
    /// Highest rating first
    Rating,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Created => SortOrder::Created,
            SortArg::Alpha => SortOrder::Alpha,
            SortArg::Progress => SortOrder::Progress,
            SortArg::Rating => SortOrder::Rating,
        }
    }
}

/// Status filter for `list`, with `all` for no filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StatusFilter {
    #[default]
    All,
    Watching,
    Completed,
    Plan,
    Hold,
    Dropped,
}

impl StatusFilter {
    pub fn status(self) -> Option<WatchStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Watching => Some(WatchStatus::Watching),
            StatusFilter::Completed => Some(WatchStatus::Completed),
            StatusFilter::Plan => Some(WatchStatus::Plan),
            StatusFilter::Hold => Some(WatchStatus::Hold),
            StatusFilter::Dropped => Some(WatchStatus::Dropped),
        }
    }
}

/// Anime season filter, with `all` for no filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SeasonArg {
    All,
    Winter,
    Spring,
    Summer,
    Fall,
}

impl SeasonArg {
    pub fn season(self) -> Option<Season> {
        match self {
            SeasonArg::All => None,
            SeasonArg::Winter => Some(Season::Winter),
            SeasonArg::Spring => Some(Season::Spring),
            SeasonArg::Summer => Some(Season::Summer),
            SeasonArg::Fall => Some(Season::Fall),
        }
    }
}
