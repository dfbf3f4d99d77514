//! The user's anime watchlist
//!
//! Entries and settings live in the local store next to the response cache,
//! under their own keys so cache sweeps never touch them.

mod entry;
mod settings;
mod tracker;

pub use entry::{AnimeEntry, WatchStatus, new_id};
pub use settings::Settings;
pub use tracker::{
    BatchReport, ITEMS_KEY, ListQuery, SETTINGS_KEY, SortOrder, Upsert, WatchStats, Watchlist,
};
