//! Core traits for the portfolio engine's collaborators.

mod notifier;
mod price_feed;
mod signal_source;
mod store;

pub use notifier::Notifier;
pub use price_feed::PriceFeed;
pub use signal_source::SignalSource;
pub use store::{PersistedPortfolio, PortfolioStore};
