//! Notifier that writes messages to the log.

use async_trait::async_trait;
use portfolio_core::error::NotifyError;
use portfolio_core::traits::Notifier;
use tracing::info;

/// Logs every message at info level. Used when no chat integration is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        info!(target: "notify", "{}", message);
        Ok(())
    }

    fn name(&self) -> &str {
        "Log"
    }
}
