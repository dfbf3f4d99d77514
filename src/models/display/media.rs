//! AniList media display model

use serde::Serialize;
use tabled::Tabled;

use super::common::truncate_string;
use crate::client::Media;

/// Media for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct MediaDisplay {
    #[tabled(rename = "#")]
    pub rank: usize,

    #[tabled(rename = "ANILIST ID")]
    pub anilist_id: u64,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "EPS")]
    pub episodes: String,

    #[tabled(rename = "SCORE")]
    pub score: String,

    #[tabled(rename = "GENRES")]
    pub genres: String,

    #[tabled(rename = "STUDIO")]
    pub studios: String,
}

impl MediaDisplay {
    /// Row for the `rank`-th result (1-based)
    pub fn ranked(rank: usize, media: &Media) -> Self {
        Self {
            rank,
            anilist_id: media.id,
            title: truncate_string(media.display_title(), 40),
            episodes: media
                .episodes
                .map(|e| e.to_string())
                .unwrap_or_else(|| "??".to_string()),
            score: media
                .score()
                .map(|s| format!("{:.1}", s))
                .unwrap_or_else(|| "??".to_string()),
            genres: media
                .genres
                .iter()
                .take(2)
                .cloned()
                .collect::<Vec<_>>()
                .join(" · "),
            studios: truncate_string(&media.studio_names(), 24),
        }
    }

    /// Rows for a result list, numbered from 1
    pub fn ranked_list(media: &[Media]) -> Vec<Self> {
        media
            .iter()
            .enumerate()
            .map(|(i, m)| Self::ranked(i + 1, m))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::{MediaTitle, Studio, StudioConnection};

    #[test]
    fn test_media_display() {
        let media = Media {
            id: 21,
            title: MediaTitle {
                romaji: Some("One Piece".into()),
                ..Default::default()
            },
            average_score: Some(88),
            genres: vec!["Action".into(), "Adventure".into(), "Comedy".into()],
            studios: Some(StudioConnection {
                nodes: vec![Studio {
                    name: "Toei Animation".into(),
                }],
            }),
            ..Default::default()
        };

        let display = MediaDisplay::ranked(1, &media);

        assert_eq!(display.title, "One Piece");
        assert_eq!(display.episodes, "??");
        assert_eq!(display.score, "8.8");
        assert_eq!(display.genres, "Action · Adventure");
        assert_eq!(display.studios, "Toei Animation");
    }

    #[test]
    fn test_ranked_list_numbers_from_one() {
        let media = vec![
            Media {
                id: 1,
                ..Default::default()
            },
            Media {
                id: 2,
                ..Default::default()
            },
        ];
        let rows = MediaDisplay::ranked_list(&media);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].rank, 2);
    }
}
