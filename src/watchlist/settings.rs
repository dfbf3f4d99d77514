//! Tracker settings

use serde::{Deserialize, Serialize};

pub const DEFAULT_EPISODES: u32 = 12;
pub const DEFAULT_EPISODE_DURATION: u32 = 24;

/// User preferences stored alongside the watchlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Episode count for new entries when none is known
    pub default_episodes: u32,
    /// Minutes per episode, for the hours-watched stat
    pub episode_duration: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_episodes: DEFAULT_EPISODES,
            episode_duration: DEFAULT_EPISODE_DURATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"episodeDuration": 45}"#).unwrap();

        assert_eq!(settings.default_episodes, 12);
        assert_eq!(settings.episode_duration, 45);
    }

    #[test]
    fn test_empty_object() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
