mod cli;
pub mod core;

use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Command};

/// `env_file` is the `.env` that was loaded before argument parsing, if any.
pub async fn run(cli: Cli, env_file: Option<PathBuf>) -> ExitCode {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,modindex_lib=debug")),
        )
        .init();

    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {:?}", path);
    }

    match cli::execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
