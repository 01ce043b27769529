//! Signal source trait definition.

use crate::error::SignalError;
use crate::types::SignalBook;
use async_trait::async_trait;

/// Trait for upstream signal producers.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Read the most recent signals, aggregated per ticker.
    async fn latest(&self) -> Result<SignalBook, SignalError>;

    /// Get the source name.
    fn name(&self) -> &str;
}
