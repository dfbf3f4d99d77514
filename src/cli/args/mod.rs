//! Shared CLI argument types
//!
//! This module contains reusable argument structs that can be flattened
//! into commands using `#[command(flatten)]`.

mod common;
mod filters;
mod global;

pub use common::{OutputFormat, SeasonArg, SortArg, StatusFilter};
pub use filters::{CatalogFilterArgs, EntryFields, ListFilterArgs};
pub use global::GlobalOptions;
