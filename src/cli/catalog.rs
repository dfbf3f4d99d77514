//! AniList catalog commands: discover and search

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use serde_json::{Map, Value, json};

use crate::cache::CacheSweeper;
use crate::cli::{CatalogFilterArgs, CommandContext, GlobalOptions, OutputFormat};
use crate::client::{self, CategoryPage, CategoryResult, DiscoverFilters, Media, Source};
use crate::error::{Error, Result};
use crate::models::MediaDisplay;
use crate::output::formatters::format_age;
use crate::output::json::{format_json, format_json_from};
use crate::output::table::format_table;
use crate::watchlist::{AnimeEntry, WatchStatus};

/// Best AniList match for a title
pub async fn lookup_media(ctx: &CommandContext, title: &str) -> Result<Option<Media>> {
    let client = ctx.client()?;
    let spinner = spinner(ctx.format, format!("Looking up {} on AniList...", title));
    let media = client::find_media(&client, title).await;
    spinner.finish_and_clear();
    Ok(media?)
}

/// Run the discover command, once or every `watch` seconds until Ctrl-C
pub async fn discover(
    opts: &GlobalOptions,
    filters: &CatalogFilterArgs,
    watch: Option<u64>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let client = ctx.client()?;
    let filters = filters.to_filters_or_current();
    debug!("Discover filters: {:?}", filters);

    let Some(secs) = watch else {
        let results = load(&ctx, &client, &filters).await;
        return print_discover(ctx.format, &filters, &results);
    };

    let _sweeper = CacheSweeper::spawn(ctx.cache.clone(), ctx.cache.ttl());
    let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let results = load(&ctx, &client, &filters).await;
                if ctx.format != OutputFormat::Json {
                    println!(
                        "{}",
                        format!("Refreshed {}", chrono::Local::now().format("%H:%M:%S")).dimmed()
                    );
                }
                print_discover(ctx.format, &filters, &results)?;
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted, stopping discover refresh");
                break;
            }
        }
    }

    Ok(())
}

/// Run the search command, optionally adding one result to the watchlist
pub async fn search(
    opts: &GlobalOptions,
    text: &str,
    filters: &CatalogFilterArgs,
    add: Option<usize>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let client = ctx.client()?;
    let filters = filters.to_filters();

    let spinner = spinner(ctx.format, format!("Searching AniList for {}...", text));
    let result = client::search(&client, text, &filters).await;
    spinner.finish_and_clear();
    let page = result?;

    let Some(n) = add else {
        if ctx.format != OutputFormat::Json
            && let Some(marker) = stale_marker(page.source)
        {
            eprintln!("{} Showing results {}", "⚠".yellow(), marker);
        }
        return print_page(ctx.format, &page);
    };

    let media = n
        .checked_sub(1)
        .and_then(|i| page.media.get(i))
        .ok_or_else(|| {
            Error::Other(format!(
                "No result #{} ({} results found)",
                n,
                page.media.len()
            ))
        })?;

    let settings = ctx.watchlist.settings()?;
    let mut entry = AnimeEntry::new(media.display_title(), settings.default_episodes);
    entry.status = WatchStatus::Plan;
    entry.fill_from_media(media, settings.default_episodes);
    let (entry, _) = ctx.watchlist.upsert(entry)?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&entry)?),
        _ => println!(
            "{} Added {} to your plan list ({})",
            "✓".green(),
            entry.title.bold(),
            entry.id
        ),
    }

    Ok(())
}

async fn load<T: client::GraphqlTransport>(
    ctx: &CommandContext,
    client: &client::AniListClient<T>,
    filters: &DiscoverFilters,
) -> Vec<CategoryResult> {
    let spinner = spinner(ctx.format, "Loading from AniList...".to_string());
    let results = client::load_discover(client, filters).await;
    spinner.finish_and_clear();
    results
}

/// Spinner on stderr; hidden for JSON output and when stderr is not a terminal
fn spinner(format: OutputFormat, message: String) -> ProgressBar {
    if format == OutputFormat::Json {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_discover(
    format: OutputFormat,
    filters: &DiscoverFilters,
    results: &[CategoryResult],
) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", format_json(&discover_json(results))?);
        return Ok(());
    }

    if let Some(scope) = filter_summary(filters) {
        println!("{}\n", scope.dimmed());
    }

    for (i, section) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }
        match &section.result {
            Ok(page) => {
                let mut heading = section.category.label().bold().to_string();
                if let Some(marker) = stale_marker(page.source) {
                    heading.push_str(&format!(" {}", marker.yellow()));
                }
                println!("{}", heading);
                print_page(format, page)?;
            }
            Err(e) => {
                println!("{}", section.category.label().bold());
                println!("{} {}", "⚠".yellow(), e);
            }
        }
    }

    Ok(())
}

fn print_page(format: OutputFormat, page: &CategoryPage) -> Result<()> {
    match format {
        OutputFormat::Pretty => {
            if page.media.is_empty() {
                println!("  No results found.");
            }
            for (i, media) in page.media.iter().enumerate() {
                println!("{}", media_line(i + 1, media));
            }
        }
        OutputFormat::Table => {
            println!("{}", format_table(&MediaDisplay::ranked_list(&page.media)));
        }
        OutputFormat::Json => println!(
            "{}",
            format_json_from(&json!({ "stale": page.stale, "media": page.media }), page.source)?
        ),
    }
    Ok(())
}

/// `(cached 3h ago, offline)` for stale results
fn stale_marker(source: Source) -> Option<String> {
    let Source::Stale { stored_at } = source else {
        return None;
    };
    let age_millis = (chrono::Utc::now().timestamp_millis() - stored_at).max(0) as u64;
    Some(format!(
        "(cached {} ago, offline)",
        format_age(Duration::from_millis(age_millis))
    ))
}

/// `{"trending": {"stale": false, "media": [...]}, "top": {"error": "..."}, ...}`
fn discover_json(results: &[CategoryResult]) -> Value {
    let mut sections = Map::new();
    for section in results {
        let value = match &section.result {
            Ok(page) => json!({ "stale": page.stale, "media": page.media }),
            Err(e) => json!({ "error": e.to_string() }),
        };
        sections.insert(section.category.key().to_string(), value);
    }
    Value::Object(sections)
}

fn filter_summary(filters: &DiscoverFilters) -> Option<String> {
    let mut parts = Vec::new();
    match (filters.season, filters.year) {
        (Some(season), Some(year)) => parts.push(format!("{} {}", season, year)),
        (Some(season), None) => parts.push(season.to_string()),
        (None, Some(year)) => parts.push(year.to_string()),
        (None, None) => {}
    }
    if let Some(genre) = filters.genre.as_deref()
        && !genre.trim().is_empty()
        && !genre.eq_ignore_ascii_case("all")
    {
        parts.push(genre.to_string());
    }
    (!parts.is_empty()).then(|| parts.join(" · "))
}

fn media_line(rank: usize, media: &Media) -> String {
    let mut line = format!("{:>3}. {}", rank, media.display_title().bold());
    if let Some(score) = media.score() {
        line.push_str(&format!("  ★ {:.1}", score));
    }
    if let Some(episodes) = media.episodes {
        line.push_str(&format!("  {} eps", episodes));
    }
    if !media.genres.is_empty() {
        let genres: Vec<&str> = media.genres.iter().take(3).map(String::as_str).collect();
        line.push_str(&format!("  {}", genres.join(", ").dimmed()));
    }
    line
}
