//! Single tick command.

use anyhow::{Context, Result};
use chrono::Utc;
use portfolio_config::AppConfig;
use portfolio_core::traits::PortfolioStore;
use portfolio_data::MemoryStore;
use portfolio_monitor::PortfolioReport;
use std::sync::Arc;

use crate::cli::TickArgs;
use super::{build_manager, csv_store, notifier};

pub async fn run(args: TickArgs, config: &AppConfig) -> Result<()> {
    let csv = csv_store(config);
    let store: Arc<dyn PortfolioStore> = if args.dry_run {
        let persisted = csv.load().context("loading persisted portfolio")?;
        Arc::new(MemoryStore::seeded(persisted))
    } else {
        Arc::new(csv)
    };

    let manager = build_manager(config, store, notifier(config, args.dry_run)?)?;
    let mut state = manager.load_state().context("loading persisted portfolio")?;
    let report = manager
        .tick(&mut state, Utc::now())
        .await
        .context("tick failed, nothing was persisted")?;

    if args.dry_run {
        println!("Dry run: nothing was written to disk.");
    }
    if report.events.is_empty() {
        println!("No positions opened or closed.");
    }
    for event in &report.events {
        println!("{}", event.message());
    }
    for ticker in &report.price_failures {
        println!("Price unavailable for {}, kept last price", ticker);
    }
    println!();
    print!("{}", PortfolioReport::from_state(&state, 5, report.at).summary());

    Ok(())
}
