//! Portfolio manager CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use portfolio_config::load_config;
use portfolio_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Runs before logging so it can report a config that fails to load.
    if matches!(cli.command, Commands::ValidateConfig) {
        return cli::commands::validate::run(&cli.config);
    }

    let config = load_config(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let _log_guard = setup_logging(
        &level,
        cli.json_logs || config.logging.is_json(),
        config.logging.file.as_deref(),
    );

    match cli.command {
        Commands::Run => cli::commands::run::run(&config).await,
        Commands::Tick(args) => cli::commands::tick::run(args, &config).await,
        Commands::Status(args) => cli::commands::status::run(args, &config),
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config),
    }
}
