//! animetrack - Terminal anime watchlist tracker backed by the AniList API

use std::io;

use clap::{CommandFactory, Parser};
use log::LevelFilter;

mod cache;
mod cli;
mod client;
mod clock;
mod config;
mod error;
mod models;
mod output;
mod store;
mod watchlist;

use cli::{CacheCommands, Cli, Commands, ConfigCommands, GlobalOptions, SettingsCommands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::List { filters } => cli::watchlist::list(&opts, &filters),
        Commands::Add { title, fields } => cli::watchlist::add(&opts, &title, &fields).await,
        Commands::Edit { id, title, fields } => {
            cli::watchlist::edit(&opts, &id, title.as_deref(), &fields).await
        }
        Commands::Watch { id, episodes } => cli::watchlist::watch(&opts, &id, episodes),
        Commands::Batch {
            ids,
            status,
            increment,
        } => cli::watchlist::batch(&opts, &ids, status, increment),
        Commands::Remove { id } => cli::watchlist::remove(&opts, &id),
        Commands::Clear { yes } => cli::watchlist::clear(&opts, yes),
        Commands::Stats => cli::watchlist::stats(&opts),
        Commands::Import { file } => cli::watchlist::import(&opts, &file),
        Commands::Export { file } => cli::watchlist::export(&opts, file.as_deref()),
        Commands::Cover { id } => cli::watchlist::cover(&opts, &id).await,
        Commands::Discover { filters, watch } => {
            cli::catalog::discover(&opts, &filters, watch).await
        }
        Commands::Search { text, filters, add } => {
            cli::catalog::search(&opts, &text, &filters, add).await
        }
        Commands::Settings(cmd) => match cmd {
            SettingsCommands::Show => cli::settings::show(&opts),
            SettingsCommands::Set {
                default_episodes,
                episode_duration,
            } => cli::settings::set(&opts, default_episodes, episode_duration),
        },
        Commands::Cache(cmd) => match cmd {
            CacheCommands::Status => cli::cache::status(&opts),
            CacheCommands::Clear { prefix } => cli::cache::clear(&opts, prefix.as_deref()),
            CacheCommands::Sweep => cli::cache::sweep(&opts),
            CacheCommands::Path => cli::cache::path(&opts),
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => cli::config::show(&opts),
            ConfigCommands::Path => cli::config::path(&opts),
        },
        Commands::Status => cli::status::run(&opts),
        Commands::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "animetrack", &mut io::stdout());
            Ok(())
        }
    }
}

/// `--debug` forces debug output; otherwise `RUST_LOG` applies, defaulting to warnings
fn init_logging(debug: bool) {
    let mut builder = if debug {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(LevelFilter::Debug);
        builder
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
    };
    builder.format_timestamp(None).init();
}
