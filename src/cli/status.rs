//! Status command implementation

use colored::Colorize;
use serde_json::json;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::output::formatters::format_size;
use crate::output::json::format_json;

/// Show where data lives and how much of it there is
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let config_path = Config::resolve_path(opts.config_ref())?;
    let ctx = CommandContext::new(opts)?;

    let entries = ctx.watchlist.entries()?.len();
    let stats = ctx.cache.stats()?;
    let location = ctx.store.location();
    let used = ctx.store.usage()?;
    let quota = ctx.config.store.quota_bytes;

    if ctx.format == OutputFormat::Json {
        let data = json!({
            "config_file": config_path.display().to_string(),
            "config_exists": config_path.exists(),
            "data_dir": ctx.data_dir.display().to_string(),
            "store": location.as_ref().map(|p| p.display().to_string()),
            "persistent": location.is_some(),
            "store_bytes": used,
            "quota_bytes": quota,
            "entries": entries,
            "cached_responses": stats.valid_entries,
            "expired_responses": stats.expired_entries,
            "api_url": ctx.config.api_url,
        });
        println!("{}", format_json(&data)?);
        return Ok(());
    }

    println!("{}\n", "animetrack status".bold());

    if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!(
            "Config file: {} {}",
            config_path.display().to_string().cyan(),
            "(not found, using defaults)".dimmed()
        );
    }

    match &location {
        Some(path) => println!(
            "{} Store: {} ({} of {})",
            "✓".green(),
            path.display().to_string().cyan(),
            format_size(used),
            format_size(quota)
        ),
        None => {
            println!("{} Store unavailable, using in-memory storage", "⚠".yellow());
            println!("  → Changes will not be saved. Check {}", ctx.data_dir.display());
        }
    }

    println!("{} {} anime tracked", "✓".green(), entries);
    println!(
        "{} {} cached responses ({} expired, {})",
        "○".dimmed(),
        stats.valid_entries,
        stats.expired_entries,
        format_size(stats.total_size_bytes)
    );
    println!("{} AniList endpoint: {}", "○".dimmed(), ctx.config.api_url);
    println!();

    Ok(())
}
