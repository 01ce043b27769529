//! Portfolio state threaded through ticks.

use chrono::{DateTime, Utc};
use portfolio_core::error::{LedgerError, StoreError};
use portfolio_core::traits::PersistedPortfolio;
use portfolio_core::types::{CloseAction, Direction, Position, SettlementRecord};
use portfolio_risk::{CapitalAllocator, CapitalSummary, EngineConfig, RiskEngine};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::warn;

use crate::{PositionLedger, SettlementHistory};

/// One portfolio: its open positions and settlement history.
///
/// Independent values can run side by side; nothing is process-global.
#[derive(Debug, Clone)]
pub struct PortfolioState {
    capital: CapitalAllocator,
    ledger: PositionLedger,
    history: SettlementHistory,
}

impl PortfolioState {
    /// Create an empty portfolio.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            capital: CapitalAllocator::new(config.initial_value),
            ledger: PositionLedger::new(RiskEngine::new(config)),
            history: SettlementHistory::new(),
        }
    }

    /// Rebuild a portfolio from persisted data.
    ///
    /// Settlements and positions are identified by ticker and open time. A
    /// settlement recorded twice counts once. An open position that already
    /// appears in the ledger was settled by a tick whose snapshot write did
    /// not complete; it is dropped rather than counted twice.
    pub fn restore(config: &EngineConfig, persisted: PersistedPortfolio) -> Result<Self, StoreError> {
        let mut settled_keys: HashSet<(String, DateTime<Utc>)> = HashSet::new();
        let mut settled = Vec::with_capacity(persisted.settled.len());
        for record in persisted.settled {
            if !settled_keys.insert((record.ticker.clone(), record.opened_at)) {
                warn!(ticker = %record.ticker, opened_at = %record.opened_at, "Duplicate settlement, ignoring");
                continue;
            }
            settled.push(record);
        }

        let mut ledger = PositionLedger::new(RiskEngine::new(config));
        for position in persisted.open {
            let key = (position.ticker().to_string(), position.opened_at());
            if settled_keys.contains(&key) {
                warn!(
                    ticker = position.ticker(),
                    "Snapshot position already settled, dropping"
                );
                continue;
            }
            ledger.restore(position).map_err(|e| match e {
                LedgerError::AlreadyOpen(ticker) | LedgerError::NotFound(ticker) => {
                    StoreError::DuplicatePosition(ticker)
                }
            })?;
        }

        Ok(Self {
            capital: CapitalAllocator::new(config.initial_value),
            ledger,
            history: SettlementHistory::from_records(settled),
        })
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut PositionLedger {
        &mut self.ledger
    }

    pub fn history(&self) -> &SettlementHistory {
        &self.history
    }

    /// Current capital figures, derived fresh from ledger and history.
    pub fn capital(&self) -> CapitalSummary {
        self.capital.summarize(self.ledger.list_open(), &self.history)
    }

    pub fn total_value(&self) -> Decimal {
        self.capital().total_value
    }

    pub fn available_capital(&self) -> Decimal {
        self.capital().available_capital
    }

    /// Open a position on the ledger.
    pub fn open(
        &mut self,
        ticker: &str,
        direction: Direction,
        entry_price: Decimal,
        investment_amount: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Result<&Position, LedgerError> {
        self.ledger
            .open(ticker, direction, entry_price, investment_amount, opened_at)
    }

    /// Close a position into the settlement history.
    pub fn close(
        &mut self,
        ticker: &str,
        action: CloseAction,
        closed_at: DateTime<Utc>,
    ) -> Result<&SettlementRecord, LedgerError> {
        self.ledger.close(ticker, action, closed_at, &mut self.history)
    }

    /// Open positions as an owned list, in ticker order.
    pub fn open_positions(&self) -> Vec<Position> {
        self.ledger.list_open().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    #[test]
    fn test_capital_tracks_opens_and_closes() {
        let config = EngineConfig::default();
        let mut state = PortfolioState::new(&config);
        assert_eq!(state.available_capital(), dec!(500));

        state
            .open("EURUSD", Direction::Long, dec!(1.1000), dec!(100), Utc::now())
            .unwrap();
        assert_eq!(state.available_capital(), dec!(400));

        state.ledger_mut().refresh_price("EURUSD", dec!(1.1011));
        let before_close = state.total_value();

        state.close("EURUSD", CloseAction::TakeProfit, Utc::now()).unwrap();
        assert_eq!(state.total_value(), before_close);
        assert_eq!(state.available_capital(), before_close);
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_restore_drops_already_settled_positions() {
        let config = EngineConfig::default();
        let opened = Utc::now() - Duration::minutes(30);

        let mut original = PortfolioState::new(&config);
        original
            .open("EURUSD", Direction::Long, dec!(1.1), dec!(100), opened)
            .unwrap();
        original
            .open("GBPUSD", Direction::Short, dec!(1.25), dec!(100), opened)
            .unwrap();
        let snapshot = original.open_positions();
        original.close("EURUSD", CloseAction::StopLoss, Utc::now()).unwrap();

        let persisted = PersistedPortfolio {
            open: snapshot,
            settled: original.history().iter().cloned().collect(),
        };
        let restored = PortfolioState::restore(&config, persisted).unwrap();

        assert!(!restored.ledger().contains("EURUSD"));
        assert!(restored.ledger().contains("GBPUSD"));
        assert_eq!(restored.history().len(), 1);
    }

    #[test]
    fn test_restore_counts_repeated_settlement_once() {
        let config = EngineConfig::default();
        let opened = Utc::now() - Duration::minutes(30);

        let mut state = PortfolioState::new(&config);
        state
            .open("EURUSD", Direction::Long, dec!(1.1), dec!(100), opened)
            .unwrap();
        state.ledger_mut().refresh_price("EURUSD", dec!(1.09));
        state.ledger_mut().recompute_all();
        let record = state
            .close("EURUSD", CloseAction::StopLoss, Utc::now())
            .unwrap()
            .clone();

        let persisted = PersistedPortfolio {
            open: Vec::new(),
            settled: vec![record.clone(), record],
        };
        let restored = PortfolioState::restore(&config, persisted).unwrap();

        assert_eq!(restored.history().len(), 1);
        assert_eq!(restored.total_value(), state.total_value());
    }

    #[test]
    fn test_reopen_within_same_second_survives_restore() {
        let config = EngineConfig::default();
        let first_open = Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap();
        let reopen = first_open + Duration::milliseconds(400);

        let mut state = PortfolioState::new(&config);
        state
            .open("EURUSD", Direction::Long, dec!(1.1), dec!(100), first_open)
            .unwrap();
        state.close("EURUSD", CloseAction::StopLoss, reopen).unwrap();
        state
            .open("EURUSD", Direction::Long, dec!(1.1), dec!(100), reopen)
            .unwrap();

        let persisted = PersistedPortfolio {
            open: state.open_positions(),
            settled: state.history().iter().cloned().collect(),
        };
        let restored = PortfolioState::restore(&config, persisted).unwrap();

        assert_eq!(restored.ledger().get("EURUSD").unwrap().opened_at(), reopen);
        assert_eq!(restored.history().len(), 1);
    }

    #[test]
    fn test_restore_rejects_duplicate_tickers() {
        let config = EngineConfig::default();
        let mut state = PortfolioState::new(&config);
        state
            .open("EURUSD", Direction::Long, dec!(1.1), dec!(100), Utc::now())
            .unwrap();
        let position = state.open_positions().remove(0);

        let persisted = PersistedPortfolio {
            open: vec![position.clone(), position],
            settled: Vec::new(),
        };
        assert!(matches!(
            PortfolioState::restore(&config, persisted),
            Err(StoreError::DuplicatePosition(_))
        ));
    }
}
