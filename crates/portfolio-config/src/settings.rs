//! Configuration structures.

use portfolio_risk::EngineConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "portfolio-manager".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Locations of the signal files and the durable portfolio files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub signals_dir: PathBuf,
    pub portfolio_dir: PathBuf,
    pub history_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            signals_dir: PathBuf::from("data/signals"),
            portfolio_dir: PathBuf::from("data"),
            history_dir: PathBuf::from("data"),
        }
    }
}

/// Where prices come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedProvider {
    #[default]
    Yahoo,
    /// Fixed prices from `static_prices`
    Static,
}

/// One fixed price for the static provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPrice {
    pub ticker: String,
    pub price: Decimal,
}

/// Price feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub provider: FeedProvider,
    pub base_url: String,
    pub ticker_suffix: String,
    pub timeout_secs: u64,
    pub static_prices: Vec<StaticPrice>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            provider: FeedProvider::Yahoo,
            base_url: "https://query1.finance.yahoo.com".to_string(),
            ticker_suffix: "=X".to_string(),
            timeout_secs: 10,
            static_prices: Vec::new(),
        }
    }
}

impl FeedSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Notification settings. Credentials are read from the named variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    pub enabled: bool,
    pub telegram_token_env: String,
    pub telegram_chat_id_env: String,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            telegram_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            telegram_chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
        }
    }
}

/// Tick scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub interval_secs: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self { interval_secs: 120 }
    }
}

impl ScheduleSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
