//! Trailing stop-loss/take-profit ratchet.
//!
//! Each observation updates a position's profit/loss watermarks, and both exit
//! thresholds are re-derived from them:
//!
//! - `stop_loss_pct = base_stop_loss_pct + max_profit_loss_pct`
//! - `take_profit_pct = base_take_profit_pct + min_profit_loss_pct`
//!
//! As the best excursion improves the stop ratchets up; as the worst excursion
//! deepens the take-profit ratchets down. After a deep drawdown the
//! take-profit can fall below zero, so a "take profit" close may realize a loss.

use portfolio_core::types::{Direction, Position, RiskState};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::EngineConfig;

/// Pure risk computation for open positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskEngine {
    leverage: Decimal,
    base_stop_loss_pct: Decimal,
    base_take_profit_pct: Decimal,
}

impl RiskEngine {
    /// Create a risk engine from engine parameters.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            leverage: config.leverage,
            base_stop_loss_pct: config.base_stop_loss_pct,
            base_take_profit_pct: config.base_take_profit_pct,
        }
    }

    /// Risk state of a position that has just been opened.
    pub fn opening_state(&self) -> RiskState {
        RiskState::opening(self.base_stop_loss_pct, self.base_take_profit_pct)
    }

    /// Signed profit/loss in percent of the entry price.
    pub fn profit_loss_pct(direction: Direction, entry_price: Decimal, current_price: Decimal) -> Decimal {
        if entry_price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let move_pct = match direction {
            Direction::Long => (current_price - entry_price) / entry_price,
            Direction::Short => (entry_price - current_price) / entry_price,
        };
        move_pct * dec!(100)
    }

    /// Derive the next risk state from a new observation.
    ///
    /// Depends only on its arguments; `prior` supplies the watermarks.
    pub fn assess(
        &self,
        direction: Direction,
        entry_price: Decimal,
        current_price: Decimal,
        investment_amount: Decimal,
        prior: &RiskState,
    ) -> RiskState {
        let profit_loss_pct = Self::profit_loss_pct(direction, entry_price, current_price);

        let max_profit_loss_pct = prior.max_profit_loss_pct.max(profit_loss_pct);
        let min_profit_loss_pct = prior.min_profit_loss_pct.min(profit_loss_pct);

        RiskState {
            profit_loss_pct,
            monetary_gain_loss: investment_amount * profit_loss_pct * self.leverage / dec!(100),
            min_profit_loss_pct,
            max_profit_loss_pct,
            stop_loss_pct: self.base_stop_loss_pct + max_profit_loss_pct,
            take_profit_pct: self.base_take_profit_pct + min_profit_loss_pct,
        }
    }

    /// Recompute a position's risk state from its current price.
    pub fn apply(&self, position: &mut Position) -> RiskState {
        let state = self.assess(
            position.direction(),
            position.entry_price(),
            position.current_price(),
            position.investment_amount(),
            position.risk(),
        );
        debug!(
            ticker = position.ticker(),
            profit_loss_pct = %state.profit_loss_pct,
            stop_loss_pct = %state.stop_loss_pct,
            take_profit_pct = %state.take_profit_pct,
            "Recomputed risk state"
        );
        position.apply_risk(state);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn engine() -> RiskEngine {
        RiskEngine::new(&EngineConfig::default())
    }

    fn close_to(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.001)
    }

    #[test]
    fn test_long_profit_ratchets_stop_up() {
        let engine = engine();
        let state = engine.assess(
            Direction::Long,
            dec!(1.1000),
            dec!(1.1300),
            dec!(100),
            &engine.opening_state(),
        );

        assert!(close_to(state.profit_loss_pct, dec!(2.727)));
        assert!(close_to(state.monetary_gain_loss, dec!(81.818)));
        assert_eq!(state.max_profit_loss_pct, state.profit_loss_pct);
        assert_eq!(state.min_profit_loss_pct, Decimal::ZERO);
        assert!(close_to(state.stop_loss_pct, dec!(2.497)));
        assert_eq!(state.take_profit_pct, dec!(0.27));
    }

    #[test]
    fn test_short_adverse_move() {
        let engine = engine();
        let state = engine.assess(
            Direction::Short,
            dec!(1.2000),
            dec!(1.2100),
            dec!(100),
            &engine.opening_state(),
        );

        assert!(close_to(state.profit_loss_pct, dec!(-0.833)));
        assert_eq!(state.max_profit_loss_pct, Decimal::ZERO);
        assert_eq!(state.stop_loss_pct, dec!(-0.23));
        assert!(close_to(state.take_profit_pct, dec!(-0.563)));
    }

    #[test]
    fn test_thresholds_are_exact_offsets_of_watermarks() {
        let engine = engine();
        let mut state = engine.opening_state();
        for price in [dec!(1.1000), dec!(1.0950), dec!(1.1120), dec!(1.0871), dec!(1.1333)] {
            state = engine.assess(Direction::Long, dec!(1.1000), price, dec!(100), &state);
            assert_eq!(state.stop_loss_pct, dec!(-0.23) + state.max_profit_loss_pct);
            assert_eq!(state.take_profit_pct, dec!(0.27) + state.min_profit_loss_pct);
        }
    }

    #[test]
    fn test_watermarks_are_monotonic() {
        let engine = engine();
        let mut state = engine.opening_state();
        let prices = [
            dec!(1.2000), dec!(1.2050), dec!(1.1900), dec!(1.2200), dec!(1.1800),
            dec!(1.2010), dec!(1.1750), dec!(1.2300), dec!(1.2000),
        ];

        for price in prices {
            let next = engine.assess(Direction::Short, dec!(1.2000), price, dec!(100), &state);
            assert!(next.max_profit_loss_pct >= state.max_profit_loss_pct);
            assert!(next.min_profit_loss_pct <= state.min_profit_loss_pct);
            assert!(next.max_profit_loss_pct >= next.profit_loss_pct);
            assert!(next.min_profit_loss_pct <= next.profit_loss_pct);
            state = next;
        }
    }

    #[test]
    fn test_take_profit_can_go_negative_after_drawdown() {
        let engine = engine();
        let state = engine.assess(
            Direction::Long,
            dec!(100),
            dec!(99),
            dec!(100),
            &engine.opening_state(),
        );
        // -1% drawdown drags the take-profit to -0.73
        assert_eq!(state.take_profit_pct, dec!(-0.73));
    }

    #[test]
    fn test_apply_is_idempotent_for_same_price() {
        let engine = engine();
        let mut position = Position::new(
            "EURUSD",
            Direction::Long,
            dec!(1.1000),
            dec!(100),
            Utc::now(),
            engine.opening_state(),
        );
        position.mark(dec!(1.1055));
        let first = engine.apply(&mut position);
        let second = engine.apply(&mut position);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_entry_price_is_flat() {
        assert_eq!(
            RiskEngine::profit_loss_pct(Direction::Long, Decimal::ZERO, dec!(1)),
            Decimal::ZERO
        );
    }
}
