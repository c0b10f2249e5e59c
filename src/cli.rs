use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::core::cache::CacheStore;
use crate::core::config::{IndexerConfig, IndexerSettings};
use crate::core::error::IndexResult;
use crate::core::http::build_http_client;
use crate::core::pipeline;
use crate::core::remote::GithubSource;

/// Build a version-keyed index of BSQMods metadata.
#[derive(Debug, Parser)]
#[command(name = "modindex", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// GitHub token sent as a bearer credential (also read from .env).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// JSON settings file (defaults to <config dir>/modindex/settings.json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate index.json (the default).
    Generate {
        /// Rebuild even if the cache is still fresh.
        #[arg(long)]
        force: bool,
    },
    /// Delete the cached snapshot.
    ClearCache,
}

#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    #[arg(long, global = true)]
    pub repo: Option<String>,
    #[arg(long, global = true)]
    pub branch: Option<String>,
    #[arg(long, global = true)]
    pub mods_dir: Option<String>,
    #[arg(long, global = true)]
    pub api_base: Option<String>,
    #[arg(long, global = true)]
    pub raw_base: Option<String>,
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
    /// Seconds a cached index stays usable.
    #[arg(long, global = true)]
    pub cache_ttl_secs: Option<u64>,
    /// Parallel mod fetches per version.
    #[arg(long, global = true)]
    pub fetch_concurrency: Option<usize>,
    /// Versions processed at once.
    #[arg(long, global = true)]
    pub version_concurrency: Option<usize>,
    /// Mod fetches in flight across all versions.
    #[arg(long, global = true)]
    pub max_in_flight: Option<usize>,
    #[arg(long, global = true)]
    pub request_timeout_secs: Option<u64>,
}

impl From<ConfigArgs> for IndexerSettings {
    fn from(args: ConfigArgs) -> Self {
        Self {
            api_base: args.api_base,
            raw_base: args.raw_base,
            repo: args.repo,
            branch: args.branch,
            mods_dir: args.mods_dir,
            cache_dir: args.cache_dir,
            output_dir: args.output_dir,
            cache_ttl_secs: args.cache_ttl_secs,
            fetch_concurrency: args.fetch_concurrency,
            version_concurrency: args.version_concurrency,
            max_in_flight: args.max_in_flight,
            request_timeout_secs: args.request_timeout_secs,
        }
    }
}

impl Cli {
    /// Defaults, then the settings file, then flags and the token.
    ///
    /// `fallback_settings` is only read when no `--config` was given and the
    /// file exists.
    pub fn resolve_config(
        self,
        fallback_settings: Option<&Path>,
    ) -> IndexResult<(Command, IndexerConfig)> {
        let mut config = IndexerConfig::default();

        match (&self.config, fallback_settings) {
            (Some(path), _) => config.apply_settings(IndexerSettings::load(path)?),
            (None, Some(path)) if path.exists() => {
                config.apply_settings(IndexerSettings::load(path)?)
            }
            _ => {}
        }
        config.apply_settings(self.overrides.into());
        config.token = self.token.unwrap_or_default();

        let command = self.command.unwrap_or(Command::Generate { force: false });
        if let Command::Generate { force } = &command {
            config.force_refresh = *force;
        }
        Ok((command, config))
    }
}

/// Dispatch one parsed invocation.
pub async fn execute(cli: Cli) -> IndexResult<()> {
    let fallback = IndexerSettings::default_path();
    let (command, config) = cli.resolve_config(fallback.as_deref())?;

    match command {
        Command::Generate { .. } => {
            config.validate()?;
            let client = build_http_client(&config)?;
            let source = GithubSource::new(&config, client)?;
            let report = pipeline::run(&source, &config).await?;
            info!("Index available at {:?}", report.index_path);
        }
        Command::ClearCache => {
            let cache = CacheStore::new(config.cache_path());
            if cache.clear().await? {
                info!("Removed cache {:?}", cache.path());
            } else {
                info!("No cache at {:?}", cache.path());
            }
        }
    }
    Ok(())
}
