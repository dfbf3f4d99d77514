//! Discover, search, and cover lookup on top of [`AniListClient`]

use futures::future::join_all;
use log::debug;

use super::anilist::{AniListClient, QueryOutcome, Source};
use super::models::{Media, parse_media, parse_page};
use super::queries::{self, Category, DiscoverFilters};
use super::GraphqlTransport;
use crate::error::ApiError;

/// A page of media and where it came from
#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub media: Vec<Media>,
    /// Served from an expired cache entry
    pub stale: bool,
    pub source: Source,
}

impl CategoryPage {
    fn from_outcome(outcome: QueryOutcome) -> Result<Self, ApiError> {
        Ok(Self {
            media: parse_page(&outcome.payload)?,
            stale: outcome.is_stale(),
            source: outcome.source,
        })
    }
}

/// One discover section; each section succeeds or fails on its own
#[derive(Debug)]
pub struct CategoryResult {
    pub category: Category,
    pub result: Result<CategoryPage, ApiError>,
}

/// Fetch all four discover categories concurrently.
///
/// Every query is issued before any is awaited; each goes through the cache
/// and the shared rate limiter independently. Results come back in
/// [`Category::ALL`] order.
pub async fn load_discover<T: GraphqlTransport>(
    client: &AniListClient<T>,
    filters: &DiscoverFilters,
) -> Vec<CategoryResult> {
    let variables = queries::discover_variables(filters);
    let requests = Category::ALL.map(|category| {
        let query = queries::discover_query(category, filters);
        let variables = &variables;
        async move {
            debug!("Loading discover category {}", category.label());
            let result = client
                .query(&query, variables)
                .await
                .and_then(CategoryPage::from_outcome);
            CategoryResult { category, result }
        }
    });

    join_all(requests).await
}

/// Search anime by title
pub async fn search<T: GraphqlTransport>(
    client: &AniListClient<T>,
    text: &str,
    filters: &DiscoverFilters,
) -> Result<CategoryPage, ApiError> {
    let query = queries::search_query(filters);
    let variables = queries::search_variables(text, filters);
    let outcome = client.query(&query, &variables).await?;
    CategoryPage::from_outcome(outcome)
}

/// Best single match for a title, or `None` if AniList has nothing.
pub async fn find_media<T: GraphqlTransport>(
    client: &AniListClient<T>,
    title: &str,
) -> Result<Option<Media>, ApiError> {
    let outcome = client
        .query(queries::COVER_QUERY, &queries::cover_variables(title))
        .await?;
    parse_media(&outcome.payload)
}
