//! n-cli - Send messages to yourself
//!
//! Sends a push notification with an arbitrary message, or tells you when a
//! long-running command has finished.

use anyhow::Result;
use clap::Parser;
use ncli::{app, cli::Cli, config::Config, FileConfigSource};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The config only decides the log level here; every dispatch reloads it.
    let config = FileConfigSource::from_args(&cli.global)
        .and_then(|source| Config::load_from(source.path(), Some(&cli.global)));

    let filter = match &cli.global.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = config
                .as_ref()
                .map(|c| c.log_level.as_str())
                .unwrap_or("info");
            EnvFilter::new(level)
        }),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = &config {
        warn!("Failed to load configuration: {}", e);
    }

    let code = app::run(cli).await?;
    std::process::exit(code);
}
