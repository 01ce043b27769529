//! Portfolio lifecycle engine.
//!
//! Owns open positions and settlements and runs the periodic tick that turns
//! signals and prices into opens, closes and persisted snapshots.

mod history;
mod ledger;
mod manager;
mod scheduler;
mod state;

pub use history::SettlementHistory;
pub use ledger::PositionLedger;
pub use manager::{PortfolioManager, PositionEvent, TickReport};
pub use scheduler::Scheduler;
pub use state::PortfolioState;
