//! Tracker settings commands

use colored::Colorize;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::{Error, Result};
use crate::output::json::format_json;
use crate::output::table::format_key_values;
use crate::watchlist::Settings;

/// Show current settings
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    print_settings(ctx.format, &ctx.watchlist.settings()?)
}

/// Change one or both settings
pub fn set(
    opts: &GlobalOptions,
    default_episodes: Option<u32>,
    episode_duration: Option<u32>,
) -> Result<()> {
    if default_episodes.is_none() && episode_duration.is_none() {
        return Err(Error::Other(
            "Nothing to change: pass --default-episodes and/or --episode-duration".to_string(),
        ));
    }
    if episode_duration == Some(0) {
        return Err(Error::Other(
            "Episode duration must be at least 1 minute".to_string(),
        ));
    }

    let ctx = CommandContext::new(opts)?;
    let mut settings = ctx.watchlist.settings()?;
    if let Some(episodes) = default_episodes {
        settings.default_episodes = episodes;
    }
    if let Some(minutes) = episode_duration {
        settings.episode_duration = minutes;
    }
    ctx.watchlist.save_settings(&settings)?;

    if ctx.format != OutputFormat::Json {
        println!("{} Settings saved", "✓".green());
    }
    print_settings(ctx.format, &settings)
}

fn print_settings(format: OutputFormat, settings: &Settings) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", format_json(settings)?),
        _ => println!(
            "{}",
            format_key_values(&[
                ("Default episodes", settings.default_episodes.to_string()),
                (
                    "Episode duration",
                    format!("{} min", settings.episode_duration)
                ),
            ])
        ),
    }
    Ok(())
}
