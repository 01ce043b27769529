//! CLI command implementations.

pub mod run;
pub mod status;
pub mod tick;
pub mod validate;

use anyhow::{Context, Result};
use portfolio_config::{AppConfig, FeedProvider};
use portfolio_core::traits::{Notifier, PortfolioStore, PriceFeed};
use portfolio_data::{CsvPortfolioStore, CsvSignalSource};
use portfolio_engine::PortfolioManager;
use portfolio_feeds::{LogNotifier, StaticPriceFeed, TelegramNotifier, YahooConfig, YahooPriceFeed};
use std::sync::Arc;
use tracing::info;

/// The CSV store at the configured locations.
pub fn csv_store(config: &AppConfig) -> CsvPortfolioStore {
    CsvPortfolioStore::new(&config.storage.portfolio_dir, &config.storage.history_dir)
}

fn price_feed(config: &AppConfig) -> Result<Arc<dyn PriceFeed>> {
    let feed: Arc<dyn PriceFeed> = match config.feed.provider {
        FeedProvider::Yahoo => Arc::new(
            YahooPriceFeed::new(YahooConfig {
                base_url: config.feed.base_url.clone(),
                ticker_suffix: config.feed.ticker_suffix.clone(),
                timeout: config.feed.timeout(),
            })
            .context("creating Yahoo price feed")?,
        ),
        FeedProvider::Static => Arc::new(StaticPriceFeed::with_prices(
            config
                .feed
                .static_prices
                .iter()
                .map(|p| (p.ticker.clone(), p.price)),
        )),
    };
    Ok(feed)
}

/// The configured notification sink. Dry runs only log, since their trades
/// never happen.
pub fn notifier(config: &AppConfig, dry_run: bool) -> Result<Arc<dyn Notifier>> {
    if dry_run || !config.notify.enabled {
        return Ok(Arc::new(LogNotifier));
    }
    let telegram = TelegramNotifier::from_env(
        &config.notify.telegram_token_env,
        &config.notify.telegram_chat_id_env,
    )
    .context("configuring Telegram notifications")?;
    Ok(Arc::new(telegram))
}

/// Wire a manager to the configured signal source and feed.
pub fn build_manager(
    config: &AppConfig,
    store: Arc<dyn PortfolioStore>,
    notifier: Arc<dyn Notifier>,
) -> Result<PortfolioManager> {
    let signals = Arc::new(CsvSignalSource::new(&config.storage.signals_dir));
    let feed = price_feed(config)?;

    info!(
        feed = feed.name(),
        notifier = notifier.name(),
        store = store.name(),
        signals = %config.storage.signals_dir.display(),
        "Portfolio manager ready"
    );

    Ok(PortfolioManager::new(
        config.engine.clone(),
        signals,
        feed,
        notifier,
        store,
    ))
}
