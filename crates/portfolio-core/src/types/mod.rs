//! Core data types for the portfolio engine.

mod interval;
mod position;
mod settlement;
mod signal;

pub use interval::Interval;
pub use position::{Direction, Position, RiskState};
pub use settlement::{CloseAction, SettlementRecord};
pub use signal::{AggregatedSignal, SignalBook, SignalRow};
