//! Fixed-price feed for offline runs and tests.

use async_trait::async_trait;
use portfolio_core::error::FeedError;
use portfolio_core::traits::PriceFeed;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;

/// Serves prices from an in-memory table that can be changed between ticks.
#[derive(Debug, Default)]
pub struct StaticPriceFeed {
    prices: RwLock<HashMap<String, Decimal>>,
}

impl StaticPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        Self {
            prices: RwLock::new(prices.into_iter().map(|(t, p)| (t.into(), p)).collect()),
        }
    }

    pub fn set_price(&self, ticker: &str, price: Decimal) {
        if let Ok(mut prices) = self.prices.write() {
            prices.insert(ticker.to_string(), price);
        }
    }

    /// Make the ticker unavailable.
    pub fn remove(&self, ticker: &str) {
        if let Ok(mut prices) = self.prices.write() {
            prices.remove(ticker);
        }
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn latest_price(&self, ticker: &str) -> Result<Decimal, FeedError> {
        let prices = self
            .prices
            .read()
            .map_err(|_| FeedError::fetch_failed(ticker, "price table poisoned"))?;
        prices
            .get(ticker)
            .copied()
            .ok_or_else(|| FeedError::fetch_failed(ticker, "no price available"))
    }

    fn name(&self) -> &str {
        "Static"
    }
}
