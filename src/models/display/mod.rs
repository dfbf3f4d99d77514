//! Display model implementations for table and JSON output
//!
//! Display models transform domain types into CLI-friendly formats
//! with appropriate column names and serialization.

mod anime;
mod common;
mod media;

pub use anime::AnimeDisplay;
pub use common::truncate_string;
pub use media::MediaDisplay;
