//! Settled (closed) position records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Direction, Position};

/// Reason a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloseAction {
    #[serde(rename = "Closed (Take Profit)")]
    TakeProfit,
    #[serde(rename = "Closed (Stop Loss)")]
    StopLoss,
}

impl CloseAction {
    /// Label used in the settlement ledger and notifications.
    pub fn label(&self) -> &'static str {
        match self {
            CloseAction::TakeProfit => "Closed (Take Profit)",
            CloseAction::StopLoss => "Closed (Stop Loss)",
        }
    }
}

impl fmt::Display for CloseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CloseAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Closed (Take Profit)" | "TakeProfit" | "take_profit" => Ok(CloseAction::TakeProfit),
            "Closed (Stop Loss)" | "StopLoss" | "stop_loss" => Ok(CloseAction::StopLoss),
            _ => Err(format!("Invalid close action: {}", s)),
        }
    }
}

/// Immutable archive entry for a closed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub ticker: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub investment_amount: Decimal,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
    pub close_price: Decimal,
    pub profit_loss_pct: Decimal,
    pub monetary_gain_loss: Decimal,
    pub min_profit_loss_pct: Decimal,
    pub max_profit_loss_pct: Decimal,
    pub action: CloseAction,
}

impl SettlementRecord {
    /// Snapshot a position's last computed state at close.
    pub fn from_position(position: &Position, action: CloseAction, closed_at: DateTime<Utc>) -> Self {
        Self {
            ticker: position.ticker().to_string(),
            direction: position.direction(),
            entry_price: position.entry_price(),
            investment_amount: position.investment_amount(),
            opened_at: position.opened_at(),
            closed_at,
            close_price: position.current_price(),
            profit_loss_pct: position.profit_loss_pct(),
            monetary_gain_loss: position.monetary_gain_loss(),
            min_profit_loss_pct: position.min_profit_loss_pct(),
            max_profit_loss_pct: position.max_profit_loss_pct(),
            action,
        }
    }

    pub fn is_win(&self) -> bool {
        self.monetary_gain_loss > Decimal::ZERO
    }
}
