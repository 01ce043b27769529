//! Capital derivation from open positions and settlements.

use portfolio_core::types::{Position, SettlementRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Capital figures derived at one point in a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalSummary {
    /// Starting portfolio value
    pub initial_value: Decimal,
    /// Initial value plus unrealized and realized P/L
    pub total_value: Decimal,
    /// Total value not committed to open positions
    pub available_capital: Decimal,
    /// Sum of investment amounts of open positions
    pub open_exposure: Decimal,
    /// Monetary P/L of open positions
    pub unrealized_pl: Decimal,
    /// Monetary P/L of settled positions
    pub realized_pl: Decimal,
}

/// Stateless capital calculator. Owns nothing but the initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapitalAllocator {
    initial_value: Decimal,
}

impl CapitalAllocator {
    pub fn new(initial_value: Decimal) -> Self {
        Self { initial_value }
    }

    /// Derive totals from the open set and the settlement history.
    pub fn summarize<'a, O, S>(&self, open: O, settled: S) -> CapitalSummary
    where
        O: IntoIterator<Item = &'a Position>,
        S: IntoIterator<Item = &'a SettlementRecord>,
    {
        let (unrealized_pl, open_exposure) = open.into_iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(pl, exposure), position| {
                (
                    pl + position.monetary_gain_loss(),
                    exposure + position.investment_amount(),
                )
            },
        );
        let realized_pl: Decimal = settled.into_iter().map(|r| r.monetary_gain_loss).sum();

        let total_value = self.initial_value + unrealized_pl + realized_pl;

        CapitalSummary {
            initial_value: self.initial_value,
            total_value,
            available_capital: total_value - open_exposure,
            open_exposure,
            unrealized_pl,
            realized_pl,
        }
    }
}
