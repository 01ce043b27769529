//! Price feed trait definition.

use crate::error::FeedError;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for market price sources.
///
/// Each call is independent: a failure for one ticker says nothing about the
/// others. Timeouts are the implementation's responsibility.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Get the latest price for a ticker.
    ///
    /// # Arguments
    /// * `ticker` - The instrument to look up (e.g. `EURUSD`)
    async fn latest_price(&self, ticker: &str) -> Result<Decimal, FeedError>;

    /// Get the feed name.
    fn name(&self) -> &str;
}
