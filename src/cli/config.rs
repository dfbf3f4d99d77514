//! Configuration commands

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::output::json::format_json;

/// Print the effective configuration (file values with CLI overrides applied)
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&ctx.config)?),
        _ => {
            let yaml = serde_yaml::to_string(&ctx.config).map_err(ConfigError::from)?;
            print!("{}", yaml);
        }
    }

    Ok(())
}

/// Print the config file path
pub fn path(opts: &GlobalOptions) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    println!("{}", path.display());
    Ok(())
}
