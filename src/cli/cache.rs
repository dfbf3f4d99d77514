//! Cache management commands

use colored::Colorize;
use serde_json::json;

use crate::cache::CACHE_PREFIX;
use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::Result;
use crate::output::formatters::{format_millis_local, format_size};
use crate::output::json::format_json;

/// Show cache status/statistics
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let stats = ctx.cache.stats()?;
    let location = store_location(&ctx);

    match ctx.format {
        OutputFormat::Json => {
            let data = json!({
                "total_entries": stats.total_entries,
                "valid_entries": stats.valid_entries,
                "expired_entries": stats.expired_entries,
                "total_size_bytes": stats.total_size_bytes,
                "total_size_human": format_size(stats.total_size_bytes),
                "oldest_entry_millis": stats.oldest_entry,
                "newest_entry_millis": stats.newest_entry,
                "ttl_secs": ctx.cache.ttl().as_secs(),
                "path": location,
            });
            println!("{}", format_json(&data)?);
        }
        _ => {
            println!("Cache Status");
            println!("────────────────────────────────────────");
            println!("Location:       {}", location);
            println!("TTL:            {}s", ctx.cache.ttl().as_secs());
            println!("Valid entries:  {}", stats.valid_entries);
            println!("Expired:        {}", stats.expired_entries);
            println!("Total size:     {}", format_size(stats.total_size_bytes));

            if let Some(oldest) = stats.oldest_entry {
                println!("Oldest entry:   {}", format_millis_local(oldest));
            }
            if let Some(newest) = stats.newest_entry {
                println!("Newest entry:   {}", format_millis_local(newest));
            }
        }
    }

    Ok(())
}

/// Remove cached responses whose key starts with `prefix` (all of them by default)
pub fn clear(opts: &GlobalOptions, prefix: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let prefix = prefix.unwrap_or(CACHE_PREFIX);
    let removed = ctx.client()?.clear_cache(prefix)?;

    match ctx.format {
        OutputFormat::Json => println!(
            "{}",
            format_json(&json!({ "entries_removed": removed, "prefix": prefix }))?
        ),
        _ if removed > 0 => println!("{} Cleared {} cache entries", "✓".green(), removed),
        _ => println!("Cache was already empty"),
    }

    Ok(())
}

/// Remove expired cached responses
pub fn sweep(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let removed = ctx.cache.evict_expired()?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&json!({ "entries_removed": removed }))?),
        _ => println!("Removed {} expired cache entries", removed),
    }

    Ok(())
}

/// Show the store path
pub fn path(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    println!("{}", store_location(&ctx));
    Ok(())
}

fn store_location(ctx: &CommandContext) -> String {
    ctx.store
        .location()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "in-memory (not persisted)".to_string())
}
