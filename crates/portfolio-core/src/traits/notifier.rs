//! Notification sink trait definition.

use crate::error::NotifyError;
use async_trait::async_trait;

/// Best-effort sink for human-readable position messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message.
    async fn send(&self, message: &str) -> Result<(), NotifyError>;

    /// Get the sink name.
    fn name(&self) -> &str;
}
