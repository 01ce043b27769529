//! Durable portfolio storage trait definition.

use crate::error::StoreError;
use crate::types::{Position, SettlementRecord};
use chrono::{DateTime, Utc};

/// Contents of a store as last persisted.
#[derive(Debug, Clone, Default)]
pub struct PersistedPortfolio {
    /// Open positions from the latest snapshot
    pub open: Vec<Position>,
    /// Settlement ledger, oldest first
    pub settled: Vec<SettlementRecord>,
}

/// Storage for the open-position snapshot and the settlement ledger.
///
/// The snapshot is replaced wholesale on every persist; the ledger only ever
/// grows by `appended`.
pub trait PortfolioStore: Send + Sync {
    /// Load the last persisted state. A store that was never written is empty.
    fn load(&self) -> Result<PersistedPortfolio, StoreError>;

    /// Persist a tick's outcome.
    ///
    /// # Arguments
    /// * `taken_at` - Time of the tick producing the snapshot
    /// * `open` - Every position open after the tick
    /// * `appended` - Settlements created during the tick
    fn persist(
        &self,
        taken_at: DateTime<Utc>,
        open: &[Position],
        appended: &[SettlementRecord],
    ) -> Result<(), StoreError>;

    /// Get the store name.
    fn name(&self) -> &str;
}
