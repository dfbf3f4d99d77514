//! GraphQL query text for the AniList endpoints the tracker uses
//!
//! Filters are spliced into the query text rather than passed as variables,
//! so two filter sets produce two different queries (and cache keys) while the
//! variables stay `{page, perPage}`.

use std::fmt;

use chrono::Datelike;

use super::Variables;

/// Fields fetched for discover cards
const DISCOVER_FIELDS: &str = "id title{romaji native english} coverImage{large extraLarge color} bannerImage episodes status season seasonYear averageScore popularity genres studios{nodes{name}}";

/// Fields fetched for search results
const SEARCH_FIELDS: &str = "id title{romaji english native} episodes coverImage{medium large}";

/// Single best match for a title, used to fill in cover art and episode counts
pub const COVER_QUERY: &str = "query ($search: String) { Media(search: $search, type: ANIME, isAdult: false) { id coverImage { large } episodes title { english romaji } } }";

/// Results per discover category unless told otherwise
pub const DEFAULT_LIMIT: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Season for a calendar month (1-12)
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }

    /// Season and year right now, in local time
    pub fn current() -> (Self, i32) {
        let today = chrono::Local::now().date_naive();
        (Self::from_month(today.month()), today.year())
    }

    /// GraphQL enum value
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Spring => "SPRING",
            Season::Summer => "SUMMER",
            Season::Fall => "FALL",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discover tab sections, each a different sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Trending,
    Popular,
    New,
    Top,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Trending,
        Category::Popular,
        Category::New,
        Category::Top,
    ];

    /// AniList `MediaSort` value
    pub fn sort(&self) -> &'static str {
        match self {
            Category::Trending => "TRENDING_DESC",
            Category::Popular => "POPULARITY_DESC",
            Category::New => "START_DATE_DESC",
            Category::Top => "SCORE_DESC",
        }
    }

    /// Lowercase name used as a JSON key
    pub fn key(&self) -> &'static str {
        match self {
            Category::Trending => "trending",
            Category::Popular => "popular",
            Category::New => "new",
            Category::Top => "top",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Trending => "Trending",
            Category::Popular => "Popular",
            Category::New => "New",
            Category::Top => "Top Rated",
        }
    }
}

/// Season, year, and genre narrowing for discover and search
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverFilters {
    pub season: Option<Season>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub limit: u32,
}

impl Default for DiscoverFilters {
    fn default() -> Self {
        Self {
            season: None,
            year: None,
            genre: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl DiscoverFilters {
    /// Filters for the current season and year
    pub fn current_season() -> Self {
        let (season, year) = Season::current();
        Self {
            season: Some(season),
            year: Some(year),
            ..Self::default()
        }
    }

    /// Query-text arguments for the active filters, each followed by a comma.
    ///
    /// A genre of `all` (any case) or blank is no filter.
    pub fn filter_clause(&self) -> String {
        let mut clause = String::new();
        if let Some(season) = self.season {
            clause.push_str(&format!(" season: {},", season));
        }
        if let Some(year) = self.year {
            clause.push_str(&format!(" seasonYear: {},", year));
        }
        if let Some(genre) = self.genre.as_deref().map(str::trim)
            && !genre.is_empty()
            && !genre.eq_ignore_ascii_case("all")
        {
            // JSON string quoting doubles as GraphQL string quoting
            let quoted = serde_json::Value::from(genre).to_string();
            clause.push_str(&format!(" genre_in: [{}],", quoted));
        }
        clause
    }

    fn page_variables(&self) -> Variables {
        Variables::new()
            .with("page", 1)
            .with("perPage", self.limit.max(1))
    }
}

/// Query for one discover category
pub fn discover_query(category: Category, filters: &DiscoverFilters) -> String {
    format!(
        "query ($page:Int,$perPage:Int){{Page(page:$page,perPage:$perPage){{media(type:ANIME,sort:[{}],{}){{{}}}}}}}",
        category.sort(),
        filters.filter_clause(),
        DISCOVER_FIELDS
    )
}

pub fn discover_variables(filters: &DiscoverFilters) -> Variables {
    filters.page_variables()
}

/// Title search query
pub fn search_query(filters: &DiscoverFilters) -> String {
    format!(
        "query ($search:String,$page:Int,$perPage:Int){{Page(page:$page,perPage:$perPage){{media(type:ANIME,search:$search,{}){{{}}}}}}}",
        filters.filter_clause(),
        SEARCH_FIELDS
    )
}

pub fn search_variables(text: &str, filters: &DiscoverFilters) -> Variables {
    filters.page_variables().with("search", text)
}

pub fn cover_variables(title: &str) -> Variables {
    Variables::new().with("search", title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fingerprint;

    #[test]
    fn test_season_from_month() {
        let expected = [
            (1, Season::Winter),
            (2, Season::Winter),
            (3, Season::Spring),
            (5, Season::Spring),
            (6, Season::Summer),
            (8, Season::Summer),
            (9, Season::Fall),
            (11, Season::Fall),
            (12, Season::Winter),
        ];
        for (month, season) in expected {
            assert_eq!(Season::from_month(month), season, "month {}", month);
        }
    }

    #[test]
    fn test_filter_clause_all_filters() {
        let filters = DiscoverFilters {
            season: Some(Season::Fall),
            year: Some(2023),
            genre: Some("Slice of Life".into()),
            limit: 8,
        };
        assert_eq!(
            filters.filter_clause(),
            r#" season: FALL, seasonYear: 2023, genre_in: ["Slice of Life"],"#
        );
    }

    #[test]
    fn test_filter_clause_all_genre_is_ignored() {
        let filters = DiscoverFilters {
            genre: Some("All".into()),
            ..Default::default()
        };
        assert_eq!(filters.filter_clause(), "");
    }

    #[test]
    fn test_genre_is_quoted() {
        let filters = DiscoverFilters {
            genre: Some(r#"Act"ion"#.into()),
            ..Default::default()
        };
        assert!(filters.filter_clause().contains(r#"["Act\"ion"]"#));
    }

    #[test]
    fn test_discover_query_per_category() {
        let filters = DiscoverFilters::default();
        let trending = discover_query(Category::Trending, &filters);
        let top = discover_query(Category::Top, &filters);

        assert!(trending.contains("sort:[TRENDING_DESC]"));
        assert!(top.contains("sort:[SCORE_DESC]"));
        assert!(trending.contains("studios{nodes{name}}"));
        assert!(trending.ends_with("}}}"));

        // Same variables, different sort: distinct cache entries
        let vars = discover_variables(&filters);
        assert_ne!(fingerprint(&trending, &vars), fingerprint(&top, &vars));
    }

    #[test]
    fn test_search_variables() {
        let filters = DiscoverFilters {
            limit: 5,
            ..Default::default()
        };
        let vars = search_variables("Cowboy Bebop", &filters);

        assert_eq!(vars.get("search"), Some(&serde_json::json!("Cowboy Bebop")));
        assert_eq!(vars.get("perPage"), Some(&serde_json::json!(5)));
        assert_eq!(vars.get("page"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_zero_limit_requests_one() {
        let filters = DiscoverFilters {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(
            discover_variables(&filters).get("perPage"),
            Some(&serde_json::json!(1))
        );
    }
}
