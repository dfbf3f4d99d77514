//! Command execution context
//!
//! Builds the shared pieces every command needs (config, local store, response
//! cache, watchlist) and, for commands that talk to AniList, the client.

use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::cache::ResponseCache;
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::{AniListClient, HttpTransport, SlidingWindowLimiter};
use crate::clock::SystemClock;
use crate::config::Config;
use crate::error::Result;
use crate::store::{self, LocalStore};
use crate::watchlist::Watchlist;

/// Context for command execution containing config, storage, and runtime options.
pub struct CommandContext {
    /// Loaded configuration with CLI overrides applied
    pub config: Config,
    /// Output format preference
    pub format: OutputFormat,
    /// Directory holding the store
    pub data_dir: PathBuf,
    pub store: Arc<dyn LocalStore>,
    pub cache: ResponseCache,
    pub watchlist: Watchlist,
    no_cache: bool,
}

impl CommandContext {
    /// Load config and open the local store.
    ///
    /// An unusable data directory is not an error: the store falls back to
    /// memory with a warning.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;

        if let Some(url) = opts.api_url_ref() {
            config.api_url = url.to_string();
        }

        let data_dir = match opts.data_dir_ref() {
            Some(dir) => PathBuf::from(dir),
            None => match &config.store.path {
                Some(path) => path.clone(),
                None => store::data_dir()?,
            },
        };
        debug!("Using data directory {}", data_dir.display());

        let store = store::open_or_memory(&data_dir, config.store.quota_bytes);
        let cache = ResponseCache::new(store.clone(), Arc::new(SystemClock), config.cache.ttl());
        let watchlist = Watchlist::new(store.clone());

        Ok(Self {
            config,
            format: opts.format,
            data_dir,
            store,
            cache,
            watchlist,
            no_cache: opts.no_cache,
        })
    }

    /// Build an AniList client over this context's cache.
    pub fn client(&self) -> Result<AniListClient<HttpTransport>> {
        let transport = HttpTransport::new(self.config.api_url.clone())?;
        let limiter = Arc::new(SlidingWindowLimiter::new(
            self.config.rate_limit.max_requests,
            self.config.rate_limit.window(),
            self.config.rate_limit.low_remaining,
        ));

        Ok(AniListClient::new(
            transport,
            self.cache.clone(),
            limiter,
            self.config.retry.policy(),
        )
        .skip_fresh_cache(self.no_cache))
    }
}
