//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, FeedProvider, FeedSettings, LoggingConfig, NotifySettings,
    ScheduleSettings, StaticPrice, StorageSettings,
};

use config::{Config, Environment, File};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from file and environment.
///
/// Environment variables `PORTFOLIO__<SECTION>__<KEY>` override the file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("PORTFOLIO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

impl AppConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate().map_err(ConfigError::Invalid)?;

        if self.schedule.interval_secs == 0 {
            return Err(ConfigError::Invalid("schedule.interval_secs must be positive".into()));
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::Invalid("feed.timeout_secs must be positive".into()));
        }
        if !matches!(self.logging.format.to_lowercase().as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be pretty or json, got {}",
                self.logging.format
            )));
        }
        if self.feed.provider == FeedProvider::Static && self.feed.static_prices.is_empty() {
            return Err(ConfigError::Invalid(
                "feed.static_prices is required for the static provider".into(),
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
