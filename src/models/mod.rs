//! Display models for CLI output
//!
//! Converts watchlist entries and AniList media into table rows and JSON.

pub mod display;

pub use display::{AnimeDisplay, MediaDisplay};
