use std::process::ExitCode;

use clap::Parser;
use modindex_lib::core::config::load_env_file;

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing, so GITHUB_TOKEN from .env reaches clap's env fallback.
    let env_file = load_env_file(None);
    modindex_lib::run(modindex_lib::Cli::parse(), env_file).await
}
