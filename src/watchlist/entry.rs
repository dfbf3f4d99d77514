//! Watchlist entries

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Deserializer, Serialize};

use crate::client::Media;

/// Where the user is with a show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    #[default]
    Watching,
    Completed,
    Plan,
    Hold,
    Dropped,
}

impl WatchStatus {
    pub const ALL: [WatchStatus; 5] = [
        WatchStatus::Watching,
        WatchStatus::Completed,
        WatchStatus::Plan,
        WatchStatus::Hold,
        WatchStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
            WatchStatus::Plan => "plan",
            WatchStatus::Hold => "hold",
            WatchStatus::Dropped => "dropped",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        WatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown status '{}' (expected watching, completed, plan, hold or dropped)",
                    s
                )
            })
    }
}

/// One tracked anime.
///
/// Deserialization is lenient: imported or hand-edited entries may have
/// missing fields, numbers as strings, or empty strings for "none".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    #[serde(default = "untitled", deserialize_with = "lenient_title")]
    pub title: String,

    /// Alternate (usually English) title
    #[serde(default, deserialize_with = "lenient_string")]
    pub alt: String,

    /// Total episodes; 0 means unknown
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: u32,

    #[serde(default, deserialize_with = "lenient_count")]
    pub watched: u32,

    #[serde(default, deserialize_with = "lenient_status")]
    pub status: WatchStatus,

    /// User rating, 1-10
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<f64>,

    /// Cover image URL
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "lenient_anilist_id")]
    pub anilist_id: Option<u64>,
}

impl AnimeEntry {
    /// A new entry with a fresh id and default fields
    pub fn new(title: impl Into<String>, total: u32) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            alt: String::new(),
            total,
            watched: 0,
            status: WatchStatus::default(),
            rating: None,
            image: None,
            anilist_id: None,
        }
    }

    /// Pull `watched` down to `total` when the total is known
    pub fn clamp_watched(&mut self) {
        if self.total > 0 {
            self.watched = self.watched.min(self.total);
        }
    }

    /// Watch `episodes` more, completing the entry if that reaches the total.
    ///
    /// Returns true when this call completed it.
    pub fn advance(&mut self, episodes: u32) -> bool {
        self.watched = self.watched.saturating_add(episodes);
        self.clamp_watched();
        if self.total > 0 && self.watched == self.total && self.status != WatchStatus::Completed {
            self.status = WatchStatus::Completed;
            return true;
        }
        false
    }

    /// Fraction watched, 0.0-1.0 (unknown totals count as 1 episode)
    pub fn progress(&self) -> f64 {
        f64::from(self.watched) / f64::from(self.total.max(1))
    }

    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// Take cover, alternate title, AniList id and episode count from a
    /// catalog match.
    ///
    /// The total is only replaced while it is unknown or still the default
    /// episode count; a total the user typed in is kept.
    pub fn fill_from_media(&mut self, media: &Media, default_episodes: u32) {
        if let Some(url) = media.cover_url() {
            self.image = Some(url.to_string());
        }
        if let Some(alt) = media.alt_title() {
            self.alt = alt.to_string();
        }
        self.anilist_id = Some(media.id);
        if let Some(episodes) = media.episodes
            && episodes > 0
            && (self.total == 0 || self.total == default_episodes)
        {
            self.total = episodes;
            self.clamp_watched();
        }
    }

    /// Fill in empty fields from a loaded entry
    pub(crate) fn normalize(&mut self) {
        if self.id.trim().is_empty() {
            self.id = new_id();
        }
        if self.title.trim().is_empty() {
            self.title = untitled();
        }
    }
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `"id"` + base36 milliseconds + 4 base36 characters.
///
/// Ids created later sort after earlier ones as long as the millisecond
/// prefix has the same length, which holds until the year 2059.
pub fn new_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let noise = uuid::Uuid::new_v4().as_u128() as u64;
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = noise.wrapping_add(counter) % 36u64.pow(4);
    format!("id{}{:0>4}", to_base36(millis), to_base36(suffix))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn untitled() -> String {
    "Untitled".to_string()
}

/// Scalar as it may appear in hand-edited JSON
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Loose {
    fn as_number(&self) -> Option<f64> {
        match self {
            Loose::Number(n) => Some(*n),
            Loose::Text(s) => s.trim().parse().ok(),
            Loose::Bool(_) => None,
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Loose::Text(s) => Some(s),
            Loose::Number(n) => Some(n.to_string()),
            Loose::Bool(_) => None,
        }
    }
}

fn loose<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Loose>, D::Error> {
    Option::<Loose>::deserialize(deserializer)
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(loose(deserializer)?
        .and_then(|v| v.as_number())
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n.min(f64::from(u32::MAX)) as u32)
        .unwrap_or(0))
}

fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    // 0 and blank both mean unrated
    Ok(loose(deserializer)?
        .and_then(|v| v.as_number())
        .filter(|n| n.is_finite() && *n != 0.0))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(loose(deserializer)?
        .and_then(Loose::into_text)
        .unwrap_or_default())
}

fn lenient_title<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(loose(deserializer)?
        .and_then(Loose::into_text)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(untitled))
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(loose(deserializer)?
        .and_then(Loose::into_text)
        .filter(|s| !s.trim().is_empty()))
}

fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<WatchStatus, D::Error> {
    Ok(loose(deserializer)?
        .and_then(Loose::into_text)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

fn lenient_anilist_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(loose(deserializer)?
        .and_then(|v| v.as_number())
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_names() {
        for status in WatchStatus::ALL {
            assert_eq!(status.as_str().parse::<WatchStatus>().unwrap(), status);
        }
        assert_eq!("HOLD".parse::<WatchStatus>().unwrap(), WatchStatus::Hold);
        assert!("paused".parse::<WatchStatus>().is_err());
    }

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert!(id.starts_with("id"));
        assert!(id[2..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        // 8 base36 chars of millis until 2059, plus 4 of noise
        assert_eq!(id.len(), 2 + 8 + 4);
    }

    #[test]
    fn test_new_ids_are_distinct() {
        let ids: std::collections::HashSet<_> = (0..200).map(|_| new_id()).collect();
        assert!(ids.len() > 190);
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_advance_clamps_and_completes() {
        let mut entry = AnimeEntry::new("Cowboy Bebop", 26);
        entry.watched = 24;

        assert!(!entry.advance(1));
        assert_eq!(entry.watched, 25);

        assert!(entry.advance(5));
        assert_eq!(entry.watched, 26);
        assert_eq!(entry.status, WatchStatus::Completed);
    }

    #[test]
    fn test_advance_with_unknown_total_never_completes() {
        let mut entry = AnimeEntry::new("One Piece", 0);
        entry.advance(1100);

        assert_eq!(entry.watched, 1100);
        assert_eq!(entry.status, WatchStatus::Watching);
    }

    #[test]
    fn test_lenient_deserialize() {
        let json = r#"{
            "id": "idabc",
            "title": "",
            "total": "12",
            "watched": 3,
            "status": "nonsense",
            "rating": "",
            "image": "",
            "anilistId": null
        }"#;

        let entry: AnimeEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.title, "Untitled");
        assert_eq!(entry.total, 12);
        assert_eq!(entry.watched, 3);
        assert_eq!(entry.status, WatchStatus::Watching);
        assert_eq!(entry.rating, None);
        assert_eq!(entry.image, None);
        assert_eq!(entry.anilist_id, None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut entry = AnimeEntry::new("Haikyu!!", 25);
        entry.anilist_id = Some(20464);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["anilistId"], 20464);
        assert_eq!(json["status"], "watching");
    }

    #[test]
    fn test_progress_with_unknown_total() {
        let mut entry = AnimeEntry::new("x", 0);
        entry.watched = 3;
        assert_eq!(entry.progress(), 3.0);
    }

    fn frieren() -> Media {
        serde_json::from_value(serde_json::json!({
            "id": 154587,
            "coverImage": {"large": "https://img/frieren.jpg"},
            "episodes": 28,
            "title": {"english": "Frieren: Beyond Journey's End", "romaji": "Sousou no Frieren"}
        }))
        .unwrap()
    }

    #[test]
    fn test_fill_from_media_replaces_default_total() {
        let mut entry = AnimeEntry::new("Frieren", 12);
        entry.fill_from_media(&frieren(), 12);

        assert_eq!(entry.total, 28);
        assert_eq!(entry.alt, "Frieren: Beyond Journey's End");
        assert_eq!(entry.image.as_deref(), Some("https://img/frieren.jpg"));
        assert_eq!(entry.anilist_id, Some(154587));
    }

    #[test]
    fn test_fill_from_media_keeps_user_total() {
        let mut entry = AnimeEntry::new("Frieren", 24);
        entry.fill_from_media(&frieren(), 12);
        assert_eq!(entry.total, 24);

        let mut unknown = AnimeEntry::new("Frieren", 0);
        unknown.fill_from_media(&frieren(), 12);
        assert_eq!(unknown.total, 28);
    }
}
