//! Scheduled tick loop.

use anyhow::{Context, Result};
use chrono::Utc;
use portfolio_config::AppConfig;
use portfolio_engine::Scheduler;
use portfolio_monitor::PortfolioReport;
use std::pin::pin;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{build_manager, csv_store, notifier};

pub async fn run(config: &AppConfig) -> Result<()> {
    let manager = build_manager(config, Arc::new(csv_store(config)), notifier(config, false)?)?;
    let mut state = manager.load_state().context("loading persisted portfolio")?;

    let mut scheduler = Scheduler::new(config.schedule.interval());
    let mut shutdown = pin!(tokio::signal::ctrl_c());

    info!(
        interval_secs = scheduler.period().as_secs(),
        "Starting scheduler, Ctrl-C to stop"
    );

    while scheduler.next_tick(&mut shutdown).await.is_some() {
        match manager.tick(&mut state, Utc::now()).await {
            Ok(report) => {
                let headline = PortfolioReport::from_state(&state, 0, report.at).headline();
                info!(
                    tick = %report.tick_id,
                    opened = report.opened().count(),
                    closed = report.closed().count(),
                    "{}",
                    headline
                );
            }
            Err(e) => {
                error!(error = %e, "Tick failed");
                // The store may hold part of the failed tick; resume from what it has.
                match manager.load_state() {
                    Ok(reloaded) => {
                        info!(open = reloaded.ledger().len(), "Reloaded persisted portfolio");
                        state = reloaded;
                    }
                    Err(e) => warn!(error = %e, "Reload failed, keeping last committed state"),
                }
            }
        }
    }

    info!("Shutdown requested, scheduler stopped");
    Ok(())
}
