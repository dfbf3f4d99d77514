//! Reusable formatting utilities for CLI output
//!
//! Timestamps, sizes, durations, and progress bars shared across commands.

use std::time::Duration;

use chrono::{TimeZone, Utc};

/// Format a Unix timestamp in milliseconds as local date and time.
///
/// Returns "N/A" if the timestamp is zero or invalid.
///
/// # Example output
/// `2025-01-15 14:30`
pub fn format_millis_local(millis: i64) -> String {
    if millis <= 0 {
        return "N/A".to_string();
    }

    match Utc.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        _ => "N/A".to_string(),
    }
}

/// Format an age as the largest whole unit: `45s`, `12m`, `3h`, `2d`.
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// `watched/total`, with `?` for an unknown total
pub fn format_episodes(watched: u32, total: u32) -> String {
    if total == 0 {
        format!("{}/?", watched)
    } else {
        format!("{}/{}", watched, total)
    }
}

/// Fixed-width bar like `███████░░░`; empty for an unknown total.
pub fn progress_bar(watched: u32, total: u32, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        let ratio = (f64::from(watched) / f64::from(total)).min(1.0);
        (ratio * width as f64).round() as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Rating with one decimal, or `--`
pub fn format_rating(rating: Option<f64>) -> String {
    rating
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "--".to_string())
}
