//! Core types and traits for the portfolio engine.
//!
//! This crate provides the foundational building blocks including:
//! - Position and settlement types
//! - Aggregated trading signals
//! - Core traits for price feeds, notification sinks, signal sources and stores

pub mod types;
pub mod traits;
pub mod error;

pub use error::{PortfolioError, PortfolioResult};
pub use types::*;
pub use traits::*;
