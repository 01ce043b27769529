//! Engine parameters.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Immutable parameters of the risk engine and decision layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Starting portfolio value
    pub initial_value: Decimal,
    /// Capital committed to every new position
    pub fixed_stake: Decimal,
    /// Multiplier from percentage P/L to monetary P/L
    pub leverage: Decimal,
    /// Stop-loss offset added to the max watermark
    pub base_stop_loss_pct: Decimal,
    /// Take-profit offset added to the min watermark
    pub base_take_profit_pct: Decimal,
    /// Absolute evaluation score required to open (and above which a
    /// take-profit is deferred)
    pub open_threshold: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_value: dec!(500),
            fixed_stake: dec!(100),
            leverage: dec!(30),
            base_stop_loss_pct: dec!(-0.23),
            base_take_profit_pct: dec!(0.27),
            open_threshold: dec!(50),
        }
    }
}

impl EngineConfig {
    /// Check parameter sanity.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_value <= Decimal::ZERO {
            return Err(format!("initial_value must be positive, got {}", self.initial_value));
        }
        if self.fixed_stake <= Decimal::ZERO {
            return Err(format!("fixed_stake must be positive, got {}", self.fixed_stake));
        }
        if self.leverage <= Decimal::ZERO {
            return Err(format!("leverage must be positive, got {}", self.leverage));
        }
        if self.open_threshold < Decimal::ZERO {
            return Err(format!(
                "open_threshold must not be negative, got {}",
                self.open_threshold
            ));
        }
        Ok(())
    }
}
