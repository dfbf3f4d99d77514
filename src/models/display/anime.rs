//! Watchlist entry display model

use serde::Serialize;
use tabled::Tabled;

use super::common::truncate_string;
use crate::output::formatters::{format_episodes, format_rating};
use crate::watchlist::AnimeEntry;

/// Watchlist entry for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct AnimeDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "EPISODES")]
    pub episodes: String,

    #[tabled(rename = "RATING")]
    pub rating: String,

    #[tabled(rename = "ALT TITLE")]
    pub alt: String,
}

impl From<&AnimeEntry> for AnimeDisplay {
    fn from(entry: &AnimeEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: truncate_string(&entry.title, 40),
            status: entry.status.to_string(),
            episodes: format_episodes(entry.watched, entry.total),
            rating: format_rating(entry.rating),
            alt: truncate_string(&entry.alt, 30),
        }
    }
}

impl From<AnimeEntry> for AnimeDisplay {
    fn from(entry: AnimeEntry) -> Self {
        Self::from(&entry)
    }
}
