//! Open/close decision policy.

use portfolio_core::types::{AggregatedSignal, CloseAction, Direction, Position};
use rust_decimal::Decimal;

use crate::EngineConfig;

/// Outcome of evaluating a ticker for a new position.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryDecision {
    /// Open a position
    Open {
        direction: Direction,
        entry_price: Decimal,
        investment_amount: Decimal,
    },
    /// No position opened
    Rejected { reason: String },
}

impl EntryDecision {
    pub fn is_open(&self) -> bool {
        matches!(self, EntryDecision::Open { .. })
    }
}

/// Outcome of evaluating an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Hold,
    Close(CloseAction),
}

/// Signal-gated entry and exit rules.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionPolicy {
    fixed_stake: Decimal,
    open_threshold: Decimal,
}

impl DecisionPolicy {
    /// Create a policy from engine parameters.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            fixed_stake: config.fixed_stake,
            open_threshold: config.open_threshold,
        }
    }

    pub fn fixed_stake(&self) -> Decimal {
        self.fixed_stake
    }

    /// Decide whether to open a position for a signal.
    ///
    /// Opens only when no position is held for the ticker, the evaluation is
    /// strictly beyond the threshold and a full stake is available. There is
    /// no partial sizing and no queuing.
    pub fn entry_decision(
        &self,
        signal: &AggregatedSignal,
        available_capital: Decimal,
        already_open: bool,
    ) -> EntryDecision {
        if already_open {
            return EntryDecision::Rejected {
                reason: format!("{} already has an open position", signal.ticker),
            };
        }

        let direction = if signal.total_evaluation > self.open_threshold {
            Direction::Long
        } else if signal.total_evaluation < -self.open_threshold {
            Direction::Short
        } else {
            return EntryDecision::Rejected {
                reason: format!(
                    "Evaluation {} within +/-{}",
                    signal.total_evaluation, self.open_threshold
                ),
            };
        };

        if available_capital < self.fixed_stake {
            return EntryDecision::Rejected {
                reason: format!(
                    "Insufficient capital: required {}, available {}",
                    self.fixed_stake, available_capital
                ),
            };
        }

        EntryDecision::Open {
            direction,
            entry_price: signal.reference_price,
            investment_amount: self.fixed_stake,
        }
    }

    /// Decide whether an open position should be closed.
    ///
    /// A take-profit crossing closes only once the signal has weakened; a
    /// still-strong signal keeps the position open to ride the trend. Without
    /// a usable signal the take-profit is not confirmed. A stop-loss crossing
    /// always closes.
    pub fn exit_decision(&self, position: &Position, signal: Option<&AggregatedSignal>) -> ExitDecision {
        let profit_loss = position.profit_loss_pct();

        if profit_loss >= position.take_profit_pct() {
            let weakened = signal.is_some_and(|s| match position.direction() {
                Direction::Long => s.total_evaluation <= self.open_threshold,
                Direction::Short => s.total_evaluation >= -self.open_threshold,
            });
            if weakened {
                return ExitDecision::Close(CloseAction::TakeProfit);
            }
        }

        if profit_loss <= position.stop_loss_pct() {
            return ExitDecision::Close(CloseAction::StopLoss);
        }

        ExitDecision::Hold
    }
}

#[cfg(test)]
mod tests {
    use crate::RiskEngine;
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn policy() -> DecisionPolicy {
        DecisionPolicy::new(&EngineConfig::default())
    }

    fn signal(ticker: &str, evaluation: Decimal) -> AggregatedSignal {
        AggregatedSignal {
            ticker: ticker.to_string(),
            total_evaluation: evaluation,
            reference_price: dec!(1.1000),
        }
    }

    fn position_at(direction: Direction, entry: Decimal, prices: &[Decimal]) -> Position {
        let engine = RiskEngine::new(&EngineConfig::default());
        let mut position = Position::new(
            "EURUSD",
            direction,
            entry,
            dec!(100),
            Utc::now(),
            engine.opening_state(),
        );
        for price in prices {
            position.mark(*price);
            engine.apply(&mut position);
        }
        position
    }

    #[test]
    fn test_strong_bullish_signal_opens_long() {
        let decision = policy().entry_decision(&signal("EURUSD", dec!(51)), dec!(500), false);
        assert_eq!(
            decision,
            EntryDecision::Open {
                direction: Direction::Long,
                entry_price: dec!(1.1000),
                investment_amount: dec!(100),
            }
        );
    }

    #[test]
    fn test_strong_bearish_signal_opens_short() {
        let decision = policy().entry_decision(&signal("EURUSD", dec!(-75)), dec!(100), false);
        assert!(matches!(
            decision,
            EntryDecision::Open { direction: Direction::Short, .. }
        ));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!policy().entry_decision(&signal("EURUSD", dec!(50)), dec!(500), false).is_open());
        assert!(!policy().entry_decision(&signal("EURUSD", dec!(-50)), dec!(500), false).is_open());
    }

    #[test]
    fn test_insufficient_capital_rejected() {
        let decision = policy().entry_decision(&signal("EURUSD", dec!(90)), dec!(99.99), false);
        assert!(!decision.is_open());
    }

    #[test]
    fn test_already_open_rejected() {
        let decision = policy().entry_decision(&signal("EURUSD", dec!(200)), dec!(500), true);
        assert!(!decision.is_open());
    }

    #[test]
    fn test_long_take_profit_requires_weak_signal() {
        let position = position_at(Direction::Long, dec!(1.1000), &[dec!(1.1300)]);

        assert_eq!(
            policy().exit_decision(&position, Some(&signal("EURUSD", dec!(60)))),
            ExitDecision::Hold
        );
        assert_eq!(
            policy().exit_decision(&position, Some(&signal("EURUSD", dec!(40)))),
            ExitDecision::Close(CloseAction::TakeProfit)
        );
    }

    #[test]
    fn test_long_take_profit_after_dip() {
        // Peak at 1.1300 then a dip to +2.6%: still above take-profit, below
        // nothing that would stop out
        let position = position_at(Direction::Long, dec!(1.1000), &[dec!(1.1300), dec!(1.1286)]);
        assert!(position.profit_loss_pct() > position.stop_loss_pct());
        assert_eq!(
            policy().exit_decision(&position, Some(&signal("EURUSD", dec!(40)))),
            ExitDecision::Close(CloseAction::TakeProfit)
        );
    }

    #[test]
    fn test_short_stop_loss_ignores_signal() {
        let position = position_at(Direction::Short, dec!(1.2000), &[dec!(1.2100)]);

        for evaluation in [dec!(-200), dec!(0), dec!(200)] {
            assert_eq!(
                policy().exit_decision(&position, Some(&signal("EURUSD", evaluation))),
                ExitDecision::Close(CloseAction::StopLoss)
            );
        }
        assert_eq!(
            policy().exit_decision(&position, None),
            ExitDecision::Close(CloseAction::StopLoss)
        );
    }

    #[test]
    fn test_short_take_profit_requires_weak_bearish_signal() {
        let position = position_at(Direction::Short, dec!(1.2000), &[dec!(1.1940)]);
        assert!(position.profit_loss_pct() >= position.take_profit_pct());

        assert_eq!(
            policy().exit_decision(&position, Some(&signal("EURUSD", dec!(-80)))),
            ExitDecision::Hold
        );
        assert_eq!(
            policy().exit_decision(&position, Some(&signal("EURUSD", dec!(-50)))),
            ExitDecision::Close(CloseAction::TakeProfit)
        );
    }

    #[test]
    fn test_missing_signal_defers_take_profit() {
        let position = position_at(Direction::Long, dec!(1.1000), &[dec!(1.1300)]);
        assert_eq!(policy().exit_decision(&position, None), ExitDecision::Hold);
    }

    #[test]
    fn test_stop_loss_overrides_strong_signal_on_trailing_stop() {
        // Ran up 2.727%, stop ratcheted to ~2.497%, then fell back to +1%
        let position = position_at(Direction::Long, dec!(1.1000), &[dec!(1.1300), dec!(1.1110)]);
        assert_eq!(
            policy().exit_decision(&position, Some(&signal("EURUSD", dec!(90)))),
            ExitDecision::Close(CloseAction::StopLoss)
        );
    }

    #[test]
    fn test_flat_position_holds() {
        let position = position_at(Direction::Long, dec!(1.1000), &[dec!(1.1001)]);
        assert_eq!(
            policy().exit_decision(&position, Some(&signal("EURUSD", dec!(0)))),
            ExitDecision::Hold
        );
    }
}
