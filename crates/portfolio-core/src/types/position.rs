//! Open position types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(Direction::Long),
            "short" => Ok(Direction::Short),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

/// Derived risk figures of a position.
///
/// Produced by the risk engine from entry price, current price, direction and
/// the previous watermarks. Thresholds are always the base offsets plus the
/// watermarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskState {
    /// Signed profit/loss in percent of the entry price
    pub profit_loss_pct: Decimal,
    /// Leveraged profit/loss in account currency
    pub monetary_gain_loss: Decimal,
    /// Lowest profit/loss ever observed
    pub min_profit_loss_pct: Decimal,
    /// Highest profit/loss ever observed
    pub max_profit_loss_pct: Decimal,
    /// Close with a stop-loss at or below this profit/loss
    pub stop_loss_pct: Decimal,
    /// Close with a take-profit at or above this profit/loss
    pub take_profit_pct: Decimal,
}

impl RiskState {
    /// State of a freshly opened position: flat P/L, zero watermarks, base thresholds.
    pub fn opening(base_stop_loss_pct: Decimal, base_take_profit_pct: Decimal) -> Self {
        Self {
            profit_loss_pct: Decimal::ZERO,
            monetary_gain_loss: Decimal::ZERO,
            min_profit_loss_pct: Decimal::ZERO,
            max_profit_loss_pct: Decimal::ZERO,
            stop_loss_pct: base_stop_loss_pct,
            take_profit_pct: base_take_profit_pct,
        }
    }
}

/// An open position in a single instrument.
///
/// Entry price and investment amount are fixed at open. The market price and
/// risk figures change only through [`Position::mark`] and
/// [`Position::apply_risk`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    ticker: String,
    direction: Direction,
    entry_price: Decimal,
    investment_amount: Decimal,
    opened_at: DateTime<Utc>,
    current_price: Decimal,
    risk: RiskState,
}

impl Position {
    /// Create a new position marked at its entry price.
    pub fn new(
        ticker: impl Into<String>,
        direction: Direction,
        entry_price: Decimal,
        investment_amount: Decimal,
        opened_at: DateTime<Utc>,
        risk: RiskState,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            direction,
            entry_price,
            investment_amount,
            opened_at,
            current_price: entry_price,
            risk,
        }
    }

    /// Rebuild a position from persisted fields.
    pub fn restore(
        ticker: impl Into<String>,
        direction: Direction,
        entry_price: Decimal,
        investment_amount: Decimal,
        opened_at: DateTime<Utc>,
        current_price: Decimal,
        risk: RiskState,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            direction,
            entry_price,
            investment_amount,
            opened_at,
            current_price,
            risk,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entry_price(&self) -> Decimal {
        self.entry_price
    }

    pub fn investment_amount(&self) -> Decimal {
        self.investment_amount
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn current_price(&self) -> Decimal {
        self.current_price
    }

    pub fn risk(&self) -> &RiskState {
        &self.risk
    }

    pub fn profit_loss_pct(&self) -> Decimal {
        self.risk.profit_loss_pct
    }

    pub fn monetary_gain_loss(&self) -> Decimal {
        self.risk.monetary_gain_loss
    }

    pub fn min_profit_loss_pct(&self) -> Decimal {
        self.risk.min_profit_loss_pct
    }

    pub fn max_profit_loss_pct(&self) -> Decimal {
        self.risk.max_profit_loss_pct
    }

    pub fn stop_loss_pct(&self) -> Decimal {
        self.risk.stop_loss_pct
    }

    pub fn take_profit_pct(&self) -> Decimal {
        self.risk.take_profit_pct
    }

    pub fn is_long(&self) -> bool {
        self.direction == Direction::Long
    }

    /// Record the latest market price. Risk figures are stale until
    /// [`Position::apply_risk`] runs.
    pub fn mark(&mut self, price: Decimal) {
        self.current_price = price;
    }

    /// Replace the derived risk figures.
    pub fn apply_risk(&mut self, risk: RiskState) {
        self.risk = risk;
    }
}
