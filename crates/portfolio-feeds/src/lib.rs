//! Price feed and notification integrations.

mod log_notifier;
mod static_feed;
mod telegram;
mod yahoo;

pub use log_notifier::LogNotifier;
pub use static_feed::StaticPriceFeed;
pub use telegram::{TelegramConfig, TelegramNotifier};
pub use yahoo::{YahooConfig, YahooPriceFeed};
