mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use regforge_core::AppConfig;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let mut config: AppConfig = toml::from_str(&config_str)?;

    // Environment variable overrides for worker/retry tuning
    let parse_bounded =
        |v: &str| -> Option<usize> { v.parse::<usize>().ok().filter(|&n| n > 0 && n <= 64) };

    if let Ok(v) = std::env::var("REGFORGE_CONCURRENCY") {
        if let Some(n) = parse_bounded(&v) {
            config.registration.concurrency = n;
        }
    }
    if let Ok(v) = std::env::var("REGFORGE_MAX_RETRIES") {
        if let Ok(n) = v.parse::<u32>() {
            config.registration.max_retries = n;
        }
    }

    match cli.command {
        Commands::Run { count, concurrency, output } => {
            commands::run::run(config, count, concurrency, output).await?;
        }
        Commands::Status => {
            commands::status::run(config).await?;
        }
    }

    Ok(())
}
