//! Filter and field argument types for CLI commands

use clap::Args;

use super::{SeasonArg, SortArg, StatusFilter};
use crate::client::{DiscoverFilters, Season};
use crate::client::queries::DEFAULT_LIMIT;
use crate::watchlist::{ListQuery, WatchStatus};

/// Filter arguments for the watchlist `list` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ListFilterArgs {
    /// Filter by status
    #[arg(long, short = 's', value_enum, default_value = "all")]
    pub status: StatusFilter,

    /// Sort order
    #[arg(long, value_enum, default_value = "created")]
    pub sort: SortArg,

    /// Only entries with a cover image
    #[arg(long)]
    pub only_poster: bool,

    /// Case-insensitive title search
    #[arg(long, short = 'q')]
    pub search: Option<String>,
}

impl ListFilterArgs {
    pub fn to_query(&self) -> ListQuery {
        ListQuery {
            status: self.status.status(),
            sort: self.sort.into(),
            only_poster: self.only_poster,
            search: self.search.clone(),
        }
    }
}

/// Editable entry fields shared by `add` and `edit`.
#[derive(Args, Debug, Default, Clone)]
pub struct EntryFields {
    /// Alternate title
    #[arg(long)]
    pub alt: Option<String>,

    /// Total episodes (0 for unknown)
    #[arg(long)]
    pub total: Option<u32>,

    /// Episodes watched
    #[arg(long)]
    pub watched: Option<u32>,

    /// Status (watching, completed, plan, hold, dropped)
    #[arg(long)]
    pub status: Option<WatchStatus>,

    /// Rating from 1 to 10 (0 clears it)
    #[arg(long, value_parser = parse_rating)]
    pub rating: Option<f64>,

    /// Cover image URL
    #[arg(long)]
    pub image: Option<String>,

    /// Fill in cover, alternate title and episode count from AniList
    #[arg(long)]
    pub fetch: bool,
}

fn parse_rating(s: &str) -> Result<f64, String> {
    let rating: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=10.0).contains(&rating) {
        return Err("rating must be between 0 and 10".to_string());
    }
    Ok(rating)
}

/// Season, year, genre, and result-count filters for discover and search.
#[derive(Args, Debug, Default, Clone)]
pub struct CatalogFilterArgs {
    /// Season (all, winter, spring, summer, fall)
    #[arg(long, value_enum, hide_possible_values = true)]
    pub season: Option<SeasonArg>,

    /// Season year
    #[arg(long)]
    pub year: Option<i32>,

    /// Genre, e.g. "Action" (all for any)
    #[arg(long, short = 'g')]
    pub genre: Option<String>,

    /// Results per list
    #[arg(long, short = 'n', default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,
}

impl CatalogFilterArgs {
    /// Filters exactly as given
    pub fn to_filters(&self) -> DiscoverFilters {
        DiscoverFilters {
            season: self.season.and_then(SeasonArg::season),
            year: self.year,
            genre: self.genre.clone(),
            limit: self.limit,
        }
    }

    /// Filters defaulting to the current season and year when neither is given
    pub fn to_filters_or_current(&self) -> DiscoverFilters {
        let mut filters = self.to_filters();
        if self.season.is_none() && self.year.is_none() {
            let (season, year) = Season::current();
            filters.season = Some(season);
            filters.year = Some(year);
        }
        filters
    }
}
