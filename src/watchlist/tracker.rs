//! Watchlist persistence and operations
//!
//! The whole list is one JSON array under [`ITEMS_KEY`]; every mutation loads
//! it, changes it, and writes it back.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;

use super::entry::{AnimeEntry, WatchStatus};
use super::settings::Settings;
use crate::cache::CACHE_PREFIX;
use crate::error::{Error, Result, StoreError};
use crate::store::LocalStore;

pub const ITEMS_KEY: &str = "watchlist.items";
pub const SETTINGS_KEY: &str = "watchlist.settings";

/// Result of an add-or-update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Added,
    Updated,
}

/// Result of a batch update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub updated: usize,
    pub completed: usize,
    /// Requested ids with no entry
    pub missing: Vec<String>,
}

/// List ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first
    #[default]
    Created,
    Alpha,
    /// Highest watched/total first
    Progress,
    /// Highest rating first, unrated last
    Rating,
}

/// Which entries to list and how
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// `None` lists every status
    pub status: Option<WatchStatus>,
    pub sort: SortOrder,
    pub only_poster: bool,
    /// Case-insensitive substring of title or alt title
    pub search: Option<String>,
}

impl ListQuery {
    fn matches(&self, entry: &AnimeEntry, needle: Option<&str>) -> bool {
        if self.status.is_some_and(|s| s != entry.status) {
            return false;
        }
        if self.only_poster && !entry.has_image() {
            return false;
        }
        match needle {
            Some(needle) => {
                entry.title.to_lowercase().contains(needle)
                    || entry.alt.to_lowercase().contains(needle)
            }
            None => true,
        }
    }

    /// Filter and sort `entries`
    pub fn apply(&self, mut entries: Vec<AnimeEntry>) -> Vec<AnimeEntry> {
        let needle = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        entries.retain(|e| self.matches(e, needle.as_deref()));

        match self.sort {
            SortOrder::Created => entries.sort_by(|a, b| b.id.cmp(&a.id)),
            SortOrder::Alpha => {
                entries.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            }
            SortOrder::Progress => entries.sort_by(|a, b| b.progress().total_cmp(&a.progress())),
            SortOrder::Rating => entries.sort_by(|a, b| {
                b.rating
                    .unwrap_or(0.0)
                    .total_cmp(&a.rating.unwrap_or(0.0))
            }),
        }
        entries
    }
}

/// Summary numbers over a set of entries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchStats {
    pub total: usize,
    pub watching: usize,
    pub completed: usize,
    pub episodes: u64,
    /// `episodes * episode_duration / 60`, rounded
    pub hours: u64,
    /// Mean over rated entries; absent when nothing is rated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

impl WatchStats {
    pub fn compute(entries: &[AnimeEntry], settings: &Settings) -> Self {
        let count = |status| entries.iter().filter(|e| e.status == status).count();
        let episodes: u64 = entries.iter().map(|e| u64::from(e.watched)).sum();
        let minutes = episodes as f64 * f64::from(settings.episode_duration);

        let ratings: Vec<f64> = entries.iter().filter_map(|e| e.rating).collect();
        let average_rating =
            (!ratings.is_empty()).then(|| ratings.iter().sum::<f64>() / ratings.len() as f64);

        Self {
            total: entries.len(),
            watching: count(WatchStatus::Watching),
            completed: count(WatchStatus::Completed),
            episodes,
            hours: (minutes / 60.0).round() as u64,
            average_rating,
        }
    }
}

/// The user's tracked anime and settings, kept in the local store.
#[derive(Clone)]
pub struct Watchlist {
    store: Arc<dyn LocalStore>,
}

impl Watchlist {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Every entry, in stored order
    pub fn entries(&self) -> Result<Vec<AnimeEntry>> {
        let Some(raw) = self.store.get(ITEMS_KEY)? else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<AnimeEntry> = serde_json::from_str(&raw)
            .map_err(|e| Error::Other(format!("Watchlist data is corrupt: {}", e)))?;
        for entry in &mut entries {
            entry.normalize();
        }
        Ok(entries)
    }

    /// Write the list back.
    ///
    /// The response cache shares the store quota; if the list does not fit,
    /// cached responses are dropped to make room before giving up.
    fn save(&self, entries: &[AnimeEntry]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        match self.store.set(ITEMS_KEY, &json) {
            Err(StoreError::QuotaExceeded { .. }) => {
                let mut freed = 0;
                for key in self.store.keys_with_prefix(CACHE_PREFIX)? {
                    if self.store.remove(&key)? {
                        freed += 1;
                    }
                }
                info!("Dropped {} cached responses to save the watchlist", freed);
                self.store.set(ITEMS_KEY, &json)?;
                Ok(())
            }
            other => Ok(other?),
        }
    }

    pub fn get(&self, id: &str) -> Result<AnimeEntry> {
        self.entries()?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    /// Replace the entry with the same id, or append it.
    ///
    /// `watched` is clamped to `total` when the total is known.
    pub fn upsert(&self, mut entry: AnimeEntry) -> Result<(AnimeEntry, Upsert)> {
        entry.normalize();
        entry.clamp_watched();

        let mut entries = self.entries()?;
        let outcome = match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                *existing = entry.clone();
                Upsert::Updated
            }
            None => {
                entries.push(entry.clone());
                Upsert::Added
            }
        };
        self.save(&entries)?;
        debug!("{:?} watchlist entry {}", outcome, entry.id);
        Ok((entry, outcome))
    }

    pub fn remove(&self, id: &str) -> Result<AnimeEntry> {
        let mut entries = self.entries()?;
        let index = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = entries.remove(index);
        self.save(&entries)?;
        Ok(removed)
    }

    /// Mark `episodes` more as watched. Returns the entry and whether it just
    /// completed.
    pub fn watch(&self, id: &str, episodes: u32) -> Result<(AnimeEntry, bool)> {
        let mut entries = self.entries()?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let completed = entry.advance(episodes);
        let updated = entry.clone();
        self.save(&entries)?;
        Ok((updated, completed))
    }

    /// Set a status and/or add episodes on several entries at once.
    ///
    /// The status is applied first, so an increment that reaches the total
    /// still completes the entry.
    pub fn batch_update(
        &self,
        ids: &[String],
        status: Option<WatchStatus>,
        increment: u32,
    ) -> Result<BatchReport> {
        let mut entries = self.entries()?;
        let mut report = BatchReport::default();

        for id in ids {
            let Some(entry) = entries.iter_mut().find(|e| &e.id == id) else {
                report.missing.push(id.clone());
                continue;
            };
            if let Some(status) = status {
                entry.status = status;
            }
            if increment > 0 && entry.advance(increment) {
                report.completed += 1;
            }
            report.updated += 1;
        }

        if report.updated > 0 {
            self.save(&entries)?;
        }
        Ok(report)
    }

    pub fn list(&self, query: &ListQuery) -> Result<Vec<AnimeEntry>> {
        Ok(query.apply(self.entries()?))
    }

    /// Merge entries from exported JSON. Only ids not already present are
    /// added; returns how many were.
    pub fn import(&self, json: &str) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| Error::Other(format!("Invalid file or format: {}", e)))?;
        if !value.is_array() {
            return Err(Error::Other(
                "Invalid file or format: expected a JSON array".to_string(),
            ));
        }
        let incoming: Vec<AnimeEntry> = serde_json::from_value(value)
            .map_err(|e| Error::Other(format!("Invalid file or format: {}", e)))?;

        let mut entries = self.entries()?;
        let mut seen: HashSet<String> = entries.iter().map(|e| e.id.clone()).collect();
        let mut imported = 0;

        for mut entry in incoming {
            entry.normalize();
            if seen.insert(entry.id.clone()) {
                entries.push(entry);
                imported += 1;
            }
        }

        if imported > 0 {
            self.save(&entries)?;
        }
        Ok(imported)
    }

    /// The whole list as a pretty JSON array
    pub fn export(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries()?)?)
    }

    /// Remove every entry, returning how many there were
    pub fn clear(&self) -> Result<usize> {
        let count = self.entries()?.len();
        self.save(&[])?;
        Ok(count)
    }

    pub fn settings(&self) -> Result<Settings> {
        match self.store.get(SETTINGS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable settings: {}", e);
                Settings::default()
            })),
            None => Ok(Settings::default()),
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.store
            .set(SETTINGS_KEY, &serde_json::to_string(settings)?)?;
        Ok(())
    }

    pub fn stats(&self) -> Result<WatchStats> {
        Ok(WatchStats::compute(&self.entries()?, &self.settings()?))
    }
}
