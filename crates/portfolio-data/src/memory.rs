//! In-memory portfolio store.

use chrono::{DateTime, Utc};
use portfolio_core::error::StoreError;
use portfolio_core::traits::{PersistedPortfolio, PortfolioStore};
use portfolio_core::types::{Position, SettlementRecord};
use std::sync::Mutex;

/// Store that keeps everything in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<PersistedPortfolio>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted contents.
    pub fn seeded(initial: PersistedPortfolio) -> Self {
        Self {
            state: Mutex::new(initial),
        }
    }

    /// Current contents.
    pub fn snapshot(&self) -> PersistedPortfolio {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl PortfolioStore for MemoryStore {
    fn load(&self) -> Result<PersistedPortfolio, StoreError> {
        Ok(self.snapshot())
    }

    fn persist(
        &self,
        _taken_at: DateTime<Utc>,
        open: &[Position],
        appended: &[SettlementRecord],
    ) -> Result<(), StoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        state.open = open.to_vec();
        state.settled.extend_from_slice(appended);
        Ok(())
    }

    fn name(&self) -> &str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use portfolio_core::types::{CloseAction, Direction, RiskState};
    use rust_decimal_macros::dec;

    fn position(ticker: &str) -> Position {
        Position::new(
            ticker.to_string(),
            Direction::Long,
            dec!(1.1),
            dec!(100),
            Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap(),
            RiskState::opening(dec!(-0.23), dec!(0.27)),
        )
    }

    #[test]
    fn test_persist_replaces_open_and_appends_settled() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let settled = SettlementRecord::from_position(&position("A"), CloseAction::StopLoss, now);

        store.persist(now, &[position("A"), position("B")], &[]).unwrap();
        store.persist(now, &[position("B")], &[settled.clone()]).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.open, vec![position("B")]);
        assert_eq!(loaded.settled, vec![settled]);
    }

    #[test]
    fn test_seeded_store_loads_seed() {
        let store = MemoryStore::seeded(PersistedPortfolio {
            open: vec![position("EURUSD")],
            settled: Vec::new(),
        });

        assert_eq!(store.load().unwrap().open.len(), 1);
    }
}
