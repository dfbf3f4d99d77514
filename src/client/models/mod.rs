//! AniList API data models
//!
//! Only the fields the tracker reads are modelled; everything else in a
//! response is ignored.

mod media;
mod page;

pub use media::{CoverImage, Media, MediaTitle, Studio, StudioConnection};
pub use page::{parse_media, parse_page};
