//! Telegram bot notifications.

use async_trait::async_trait;
use portfolio_core::error::NotifyError;
use portfolio_core::traits::Notifier;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram bot credentials.
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl TelegramConfig {
    pub fn new(token: String, chat_id: String) -> Self {
        Self {
            token,
            chat_id,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Read credentials from the named environment variables.
    pub fn from_env(token_env: &str, chat_id_env: &str) -> Result<Self, NotifyError> {
        let token = read_env(token_env)?;
        let chat_id = read_env(chat_id_env)?;
        Ok(Self::new(token, chat_id))
    }

    fn send_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }
}

fn read_env(name: &str) -> Result<String, NotifyError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| NotifyError::Configuration(format!("{} not set", name)))
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Sends each message to one Telegram chat.
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Configuration(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn from_env(token_env: &str, chat_id_env: &str) -> Result<Self, NotifyError> {
        Self::new(TelegramConfig::from_env(token_env, chat_id_env)?)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: &self.config.chat_id,
            text: message,
            parse_mode: "HTML",
        };

        let resp = self
            .client
            .post(self.config.send_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Delivery(format!("{}: {}", status, text)));
        }

        debug!("Telegram message delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "Telegram"
    }
}
