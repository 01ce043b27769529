//! Portfolio status command.

use anyhow::{Context, Result};
use chrono::Utc;
use portfolio_config::AppConfig;
use portfolio_core::traits::PortfolioStore;
use portfolio_engine::PortfolioState;
use portfolio_monitor::PortfolioReport;

use crate::cli::{OutputFormat, StatusArgs};
use super::csv_store;

pub fn run(args: StatusArgs, config: &AppConfig) -> Result<()> {
    let store = csv_store(config);
    let persisted = store.load().context("loading persisted portfolio")?;
    let state = PortfolioState::restore(&config.engine, persisted)?;
    let report = PortfolioReport::from_state(&state, args.recent, Utc::now());

    match args.output {
        OutputFormat::Text => print!("{}", report.summary()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
