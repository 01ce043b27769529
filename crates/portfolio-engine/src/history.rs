//! Append-only settlement history.

use portfolio_core::types::SettlementRecord;
use rust_decimal::Decimal;

/// Closed positions, oldest first. Records are never edited or removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementHistory {
    records: Vec<SettlementRecord>,
}

impl SettlementHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a history from persisted records.
    pub fn from_records(records: Vec<SettlementRecord>) -> Self {
        Self { records }
    }

    /// Append a record. Only the ledger's close path calls this.
    pub(crate) fn record(&mut self, record: SettlementRecord) -> &SettlementRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Iterate records oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, SettlementRecord> {
        self.records.iter()
    }

    /// The `n` most recent records, oldest first.
    pub fn recent(&self, n: usize) -> &[SettlementRecord] {
        &self.records[self.records.len().saturating_sub(n)..]
    }

    /// Records appended after the first `len` records.
    pub fn since(&self, len: usize) -> &[SettlementRecord] {
        &self.records[len.min(self.records.len())..]
    }

    pub fn realized_pl(&self) -> Decimal {
        self.records.iter().map(|r| r.monetary_gain_loss).sum()
    }

    pub fn wins(&self) -> usize {
        self.records.iter().filter(|r| r.is_win()).count()
    }

    pub fn losses(&self) -> usize {
        self.records.iter().filter(|r| r.monetary_gain_loss < Decimal::ZERO).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a SettlementHistory {
    type Item = &'a SettlementRecord;
    type IntoIter = std::slice::Iter<'a, SettlementRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use portfolio_core::types::{CloseAction, Direction};
    use rust_decimal_macros::dec;

    fn record(ticker: &str, gain: Decimal) -> SettlementRecord {
        SettlementRecord {
            ticker: ticker.to_string(),
            direction: Direction::Long,
            entry_price: dec!(1),
            investment_amount: dec!(100),
            opened_at: Utc::now(),
            closed_at: Utc::now(),
            close_price: dec!(1),
            profit_loss_pct: Decimal::ZERO,
            monetary_gain_loss: gain,
            min_profit_loss_pct: Decimal::ZERO,
            max_profit_loss_pct: Decimal::ZERO,
            action: CloseAction::StopLoss,
        }
    }

    #[test]
    fn test_history_statistics() {
        let mut history = SettlementHistory::new();
        history.record(record("EURUSD", dec!(25)));
        history.record(record("GBPUSD", dec!(-10)));
        history.record(record("USDJPY", dec!(5)));

        assert_eq!(history.len(), 3);
        assert_eq!(history.realized_pl(), dec!(20));
        assert_eq!(history.wins(), 2);
        assert_eq!(history.losses(), 1);
    }

    #[test]
    fn test_recent_and_since() {
        let mut history = SettlementHistory::new();
        for ticker in ["A", "B", "C"] {
            history.record(record(ticker, Decimal::ZERO));
        }

        let recent: Vec<_> = history.recent(2).iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(recent, vec!["B", "C"]);
        assert_eq!(history.recent(10).len(), 3);
        assert_eq!(history.since(2).len(), 1);
        assert!(history.since(5).is_empty());
    }

    #[test]
    fn test_iteration_is_restartable() {
        let history = SettlementHistory::from_records(vec![record("A", dec!(1)), record("B", dec!(2))]);
        let first: Decimal = history.iter().map(|r| r.monetary_gain_loss).sum();
        let second: Decimal = (&history).into_iter().map(|r| r.monetary_gain_loss).sum();
        assert_eq!(first, second);
    }
}
