//! Watchlist commands

use std::fs;

use colored::{ColoredString, Colorize};
use dialoguer::{Confirm, theme::ColorfulTheme};
use log::{debug, warn};
use serde_json::json;

use crate::cli::catalog::lookup_media;
use crate::cli::{CommandContext, EntryFields, GlobalOptions, ListFilterArgs, OutputFormat};
use crate::error::{Error, Result};
use crate::models::AnimeDisplay;
use crate::output::Formattable;
use crate::output::formatters::{format_episodes, format_rating, progress_bar};
use crate::output::json::format_json;
use crate::output::table::{format_key_values, format_table_or};
use crate::watchlist::{AnimeEntry, WatchStatus};

const EMPTY_LIST: &str = "No anime tracked yet. Add one with `animetrack add <title>`.";

/// Run the list command
pub fn list(opts: &GlobalOptions, filters: &ListFilterArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let entries = ctx.watchlist.list(&filters.to_query())?;
    debug!("Listing {} entries", entries.len());

    match ctx.format {
        OutputFormat::Pretty => {
            if entries.is_empty() {
                println!("{}", EMPTY_LIST);
            }
            for entry in &entries {
                println!("{}", entry_lines(entry));
            }
        }
        OutputFormat::Table => {
            let rows: Vec<AnimeDisplay> = entries.iter().map(AnimeDisplay::from).collect();
            println!("{}", format_table_or(&rows, EMPTY_LIST));
        }
        OutputFormat::Json => println!("{}", format_json(&entries)?),
    }

    Ok(())
}

/// Add a new entry
pub async fn add(opts: &GlobalOptions, title: &str, fields: &EntryFields) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let settings = ctx.watchlist.settings()?;

    let mut entry = AnimeEntry::new(
        title.trim(),
        fields.total.unwrap_or(settings.default_episodes),
    );
    apply_fields(&mut entry, fields);

    if fields.fetch {
        fetch_details(&ctx, &mut entry, settings.default_episodes).await;
    }

    let (entry, _) = ctx.watchlist.upsert(entry)?;
    print_entry(ctx.format, &entry, "Added")
}

/// Edit an existing entry
pub async fn edit(
    opts: &GlobalOptions,
    id: &str,
    title: Option<&str>,
    fields: &EntryFields,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut entry = ctx.watchlist.get(id)?;

    if let Some(title) = title {
        entry.title = title.trim().to_string();
    }
    apply_fields(&mut entry, fields);

    if fields.fetch {
        let default_episodes = ctx.watchlist.settings()?.default_episodes;
        fetch_details(&ctx, &mut entry, default_episodes).await;
    }

    let (entry, _) = ctx.watchlist.upsert(entry)?;
    print_entry(ctx.format, &entry, "Updated")
}

/// Mark episodes as watched
pub fn watch(opts: &GlobalOptions, id: &str, episodes: u32) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let (entry, completed) = ctx.watchlist.watch(id, episodes)?;

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&json!({ "entry": entry, "completed": completed }))?
        ),
        _ => {
            println!("{}", entry_lines(&entry));
            if completed {
                println!("{} Finished {}!", "✓".green(), entry.title.bold());
            }
        }
    }

    Ok(())
}

/// Update several entries at once
pub fn batch(
    opts: &GlobalOptions,
    ids: &[String],
    status: Option<WatchStatus>,
    increment: u32,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let report = ctx.watchlist.batch_update(ids, status, increment)?;

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&json!({
                "updated": report.updated,
                "completed": report.completed,
                "missing": report.missing,
            }))?
        ),
        _ => {
            println!("{} Updated {} entries", "✓".green(), report.updated);
            if report.completed > 0 {
                println!("  {} marked completed", report.completed);
            }
            for id in &report.missing {
                eprintln!("{} No entry with id '{}'", "⚠".yellow(), id);
            }
        }
    }

    Ok(())
}

/// Remove an entry
pub fn remove(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let entry = ctx.watchlist.remove(id)?;

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&json!({ "removed": true, "id": entry.id, "title": entry.title }))?
        ),
        _ => println!("{} Removed {}", "✓".green(), entry.title.bold()),
    }

    Ok(())
}

/// Remove every entry, asking first unless `yes`
pub fn clear(opts: &GlobalOptions, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let count = ctx.watchlist.entries()?.len();

    if count > 0 && !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Remove all {} entries? This cannot be undone.", count))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = ctx.watchlist.clear()?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&json!({ "removed": removed }))?),
        _ if removed == 0 => println!("Watchlist was already empty"),
        _ => println!("{} Removed {} entries", "✓".green(), removed),
    }

    Ok(())
}

/// Show watchlist statistics
pub fn stats(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let stats = ctx.watchlist.stats()?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&stats)?),
        _ => {
            let mut rows = vec![
                ("Total", stats.total.to_string()),
                ("Watching", stats.watching.to_string()),
                ("Completed", stats.completed.to_string()),
                ("Episodes watched", stats.episodes.to_string()),
                ("Hours watched", stats.hours.to_string()),
            ];
            if stats.average_rating.is_some() {
                rows.push(("Average rating", format_rating(stats.average_rating)));
            }
            println!("{}", format_key_values(&rows));
        }
    }

    Ok(())
}

/// Merge entries from an exported file
pub fn import(opts: &GlobalOptions, file: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let contents = fs::read_to_string(file)?;
    let imported = ctx.watchlist.import(&contents)?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&json!({ "imported": imported }))?),
        _ => println!("{} Imported {} entries", "✓".green(), imported),
    }

    Ok(())
}

/// Write the watchlist as a JSON array, to a file or stdout.
///
/// The array is written bare, without the usual `data`/`meta` wrapper, so
/// that it can be fed straight back to `import`.
pub fn export(opts: &GlobalOptions, file: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let json = ctx.watchlist.export()?;

    match file {
        Some(path) => {
            fs::write(path, &json)?;
            eprintln!("{} Exported watchlist to {}", "✓".green(), path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Fill in cover art, alternate title and episode count from AniList
pub async fn cover(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut entry = ctx.watchlist.get(id)?;

    let media = lookup_media(&ctx, &entry.title)
        .await?
        .ok_or_else(|| Error::Other(format!("No AniList match for '{}'", entry.title)))?;

    let default_episodes = ctx.watchlist.settings()?.default_episodes;
    entry.fill_from_media(&media, default_episodes);
    let (entry, _) = ctx.watchlist.upsert(entry)?;

    print_entry(ctx.format, &entry, "Updated cover for")
}

fn apply_fields(entry: &mut AnimeEntry, fields: &EntryFields) {
    if let Some(alt) = &fields.alt {
        entry.alt = alt.trim().to_string();
    }
    if let Some(total) = fields.total {
        entry.total = total;
    }
    if let Some(watched) = fields.watched {
        entry.watched = watched;
    }
    if let Some(status) = fields.status {
        entry.status = status;
    }
    if let Some(rating) = fields.rating {
        entry.rating = (rating > 0.0).then_some(rating);
    }
    if let Some(image) = &fields.image {
        let image = image.trim();
        entry.image = (!image.is_empty()).then(|| image.to_string());
    }
}

/// Best-effort AniList lookup for `--fetch`; the entry is saved either way.
async fn fetch_details(ctx: &CommandContext, entry: &mut AnimeEntry, default_episodes: u32) {
    match lookup_media(ctx, &entry.title).await {
        Ok(Some(media)) => entry.fill_from_media(&media, default_episodes),
        Ok(None) => warn!("No AniList match for '{}'", entry.title),
        Err(e) => eprintln!("{} Could not fetch details: {}", "⚠".yellow(), e),
    }
}

fn print_entry(format: OutputFormat, entry: &AnimeEntry, verb: &str) -> Result<()> {
    match format {
        OutputFormat::Pretty => {
            println!("{} {} {}", "✓".green(), verb, entry.title.bold());
            println!("{}", entry_lines(entry));
        }
        OutputFormat::Table => vec![AnimeDisplay::from(entry)].print(format)?,
        OutputFormat::Json => println!("{}", format_json(entry)?),
    }
    Ok(())
}

/// Two-line summary with a progress bar
fn entry_lines(entry: &AnimeEntry) -> String {
    let mut heading = format!(
        "{}  {}  {}",
        entry.id.dimmed(),
        entry.title.bold(),
        status_label(entry.status)
    );
    if !entry.alt.is_empty() {
        heading.push_str(&format!("  {}", entry.alt.dimmed()));
    }

    let mut detail = format!(
        "    {} {}",
        progress_bar(entry.watched, entry.total, 20),
        format_episodes(entry.watched, entry.total)
    );
    if entry.rating.is_some() {
        detail.push_str(&format!("  ★ {}", format_rating(entry.rating)));
    }

    format!("{}\n{}", heading, detail)
}

fn status_label(status: WatchStatus) -> ColoredString {
    let label = status.as_str();
    match status {
        WatchStatus::Watching => label.cyan(),
        WatchStatus::Completed => label.green(),
        WatchStatus::Plan => label.blue(),
        WatchStatus::Hold => label.yellow(),
        WatchStatus::Dropped => label.red(),
    }
}
