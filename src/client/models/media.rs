//! Media models

use serde::{Deserialize, Serialize};

/// An anime as returned by the `Media` and `Page.media` selections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// AniList media ID
    pub id: u64,

    #[serde(default)]
    pub title: MediaTitle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<CoverImage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,

    /// Total episodes, unknown for airing shows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,

    /// RELEASING, FINISHED, NOT_YET_RELEASED, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_year: Option<i32>,

    /// Score out of 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_score: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u64>,

    #[serde(default)]
    pub genres: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studios: Option<StudioConnection>,
}

/// Title variants; any of them may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaTitle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romaji: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_large: Option<String>,

    /// Dominant colour as `#rrggbb`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudioConnection {
    #[serde(default)]
    pub nodes: Vec<Studio>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Studio {
    pub name: String,
}

/// Treat empty strings from the API the same as missing values
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl Media {
    /// Romaji, then English, then native, then "Untitled"
    pub fn display_title(&self) -> &str {
        non_empty(&self.title.romaji)
            .or_else(|| non_empty(&self.title.english))
            .or_else(|| non_empty(&self.title.native))
            .unwrap_or("Untitled")
    }

    /// English, then romaji. Used as the alternate title by cover lookup.
    pub fn alt_title(&self) -> Option<&str> {
        non_empty(&self.title.english).or_else(|| non_empty(&self.title.romaji))
    }

    /// Largest-first cover image URL
    pub fn cover_url(&self) -> Option<&str> {
        let cover = self.cover_image.as_ref()?;
        non_empty(&cover.large).or_else(|| non_empty(&cover.medium))
    }

    /// Score on a 0-10 scale
    pub fn score(&self) -> Option<f64> {
        self.average_score.map(|s| f64::from(s) / 10.0)
    }

    /// Studio names joined with commas
    pub fn studio_names(&self) -> String {
        self.studios
            .as_ref()
            .map(|s| {
                s.nodes
                    .iter()
                    .map(|n| n.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_discover_media() {
        let json = r##"{
            "id": 1535,
            "title": {"romaji": "Death Note", "english": "Death Note", "native": "デスノート"},
            "coverImage": {"large": "https://img/large.jpg", "extraLarge": "https://img/xl.jpg", "color": "#e4a15d"},
            "bannerImage": null,
            "episodes": 37,
            "status": "FINISHED",
            "season": "FALL",
            "seasonYear": 2006,
            "averageScore": 84,
            "popularity": 900000,
            "genres": ["Mystery", "Psychological"],
            "studios": {"nodes": [{"name": "MADHOUSE"}, {"name": "VAP"}]}
        }"##;

        let media: Media = serde_json::from_str(json).unwrap();

        assert_eq!(media.id, 1535);
        assert_eq!(media.episodes, Some(37));
        assert_eq!(media.season_year, Some(2006));
        assert_eq!(media.studio_names(), "MADHOUSE, VAP");
        assert_eq!(media.score(), Some(8.4));
        assert_eq!(media.cover_url(), Some("https://img/large.jpg"));
    }

    #[test]
    fn test_deserialize_minimal_media() {
        let media: Media = serde_json::from_str(r#"{"id": 7}"#).unwrap();

        assert_eq!(media.display_title(), "Untitled");
        assert_eq!(media.score(), None);
        assert!(media.genres.is_empty());
        assert_eq!(media.studio_names(), "");
    }

    #[test]
    fn test_display_title_preference() {
        let mut media = Media {
            id: 1,
            title: MediaTitle {
                romaji: None,
                english: Some("Frieren".into()),
                native: Some("葬送のフリーレン".into()),
            },
            ..Default::default()
        };
        assert_eq!(media.display_title(), "Frieren");

        media.title.romaji = Some("Sousou no Frieren".into());
        assert_eq!(media.display_title(), "Sousou no Frieren");

        media.title.romaji = Some(String::new());
        media.title.english = None;
        assert_eq!(media.display_title(), "葬送のフリーレン");
    }

    #[test]
    fn test_alt_title_prefers_english() {
        let media = Media {
            id: 1,
            title: MediaTitle {
                romaji: Some("Shingeki no Kyojin".into()),
                english: Some("Attack on Titan".into()),
                native: None,
            },
            ..Default::default()
        };
        assert_eq!(media.alt_title(), Some("Attack on Titan"));
    }

    #[test]
    fn test_cover_falls_back_to_medium() {
        let media = Media {
            id: 1,
            cover_image: Some(CoverImage {
                medium: Some("m.jpg".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(media.cover_url(), Some("m.jpg"));
    }
}
