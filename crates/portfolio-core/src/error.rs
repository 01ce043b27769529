//! Error types for the portfolio engine.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level portfolio engine error.
#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Price feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Position ledger transition errors.
///
/// These indicate a sequencing bug in the decision layer; a tick that hits one
/// is aborted before anything is persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Position already open for {0}")]
    AlreadyOpen(String),

    #[error("No open position for {0}")]
    NotFound(String),
}

/// Price feed errors.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Price fetch failed for {ticker}: {reason}")]
    PriceFetchFailed { ticker: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FeedError {
    pub fn fetch_failed(ticker: &str, reason: impl Into<String>) -> Self {
        FeedError::PriceFetchFailed {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

/// Signal source errors.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("No signal file found in {0}")]
    NoSignalFile(PathBuf),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Signal source unavailable: {0}")]
    Unavailable(String),
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Parse error in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Duplicate open position for {0} in snapshot")]
    DuplicatePosition(String),
}

/// Notification sink errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Result type alias for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;
