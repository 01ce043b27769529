//! Open position ledger.

use chrono::{DateTime, Utc};
use portfolio_core::error::LedgerError;
use portfolio_core::types::{CloseAction, Direction, Position, SettlementRecord};
use portfolio_risk::RiskEngine;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::SettlementHistory;

/// The set of open positions, at most one per ticker.
///
/// Positions are keyed by ticker in a sorted map, so iteration order is
/// deterministic.
#[derive(Debug, Clone)]
pub struct PositionLedger {
    positions: BTreeMap<String, Position>,
    risk: RiskEngine,
}

impl PositionLedger {
    /// Create an empty ledger.
    pub fn new(risk: RiskEngine) -> Self {
        Self {
            positions: BTreeMap::new(),
            risk,
        }
    }

    /// Mark the open position on `ticker` to `price` and recompute its risk
    /// state. Returns `false` when no position is open for the ticker.
    pub fn refresh_price(&mut self, ticker: &str, price: Decimal) -> bool {
        match self.positions.get_mut(ticker) {
            Some(position) => {
                position.mark(price);
                self.risk.apply(position);
                true
            }
            None => false,
        }
    }

    /// Recompute risk state of every open position at its current price.
    pub fn recompute_all(&mut self) {
        for position in self.positions.values_mut() {
            self.risk.apply(position);
        }
    }

    /// Open a position with zero watermarks and base thresholds.
    pub fn open(
        &mut self,
        ticker: &str,
        direction: Direction,
        entry_price: Decimal,
        investment_amount: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Result<&Position, LedgerError> {
        if self.positions.contains_key(ticker) {
            return Err(LedgerError::AlreadyOpen(ticker.to_string()));
        }
        let position = Position::new(
            ticker,
            direction,
            entry_price,
            investment_amount,
            opened_at,
            self.risk.opening_state(),
        );
        Ok(self.positions.entry(ticker.to_string()).or_insert(position))
    }

    /// Close the position on `ticker`, moving its final state into `history`.
    ///
    /// Removal from the open set and the append happen together; the position
    /// is never present in both.
    pub fn close<'h>(
        &mut self,
        ticker: &str,
        action: CloseAction,
        closed_at: DateTime<Utc>,
        history: &'h mut SettlementHistory,
    ) -> Result<&'h SettlementRecord, LedgerError> {
        let position = self
            .positions
            .remove(ticker)
            .ok_or_else(|| LedgerError::NotFound(ticker.to_string()))?;
        Ok(history.record(SettlementRecord::from_position(&position, action, closed_at)))
    }

    /// Re-insert a persisted position as-is.
    pub fn restore(&mut self, position: Position) -> Result<(), LedgerError> {
        if self.positions.contains_key(position.ticker()) {
            return Err(LedgerError::AlreadyOpen(position.ticker().to_string()));
        }
        self.positions.insert(position.ticker().to_string(), position);
        Ok(())
    }

    /// Iterate open positions in ticker order. The iterator can be cloned to
    /// restart.
    pub fn list_open(&self) -> std::collections::btree_map::Values<'_, String, Position> {
        self.positions.values()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    pub fn get(&self, ticker: &str) -> Option<&Position> {
        self.positions.get(ticker)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.positions.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn risk_engine(&self) -> &RiskEngine {
        &self.risk
    }
}
