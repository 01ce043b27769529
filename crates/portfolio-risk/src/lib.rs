//! Risk management for the portfolio engine.
//!
//! Provides the trailing stop-loss/take-profit ratchet, the open/close policy
//! and capital derivation.

mod capital;
mod config;
mod policy;
mod ratchet;

pub use capital::{CapitalAllocator, CapitalSummary};
pub use config::EngineConfig;
pub use policy::{DecisionPolicy, EntryDecision, ExitDecision};
pub use ratchet::RiskEngine;
