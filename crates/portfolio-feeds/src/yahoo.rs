//! Yahoo Finance chart API price feed.

use async_trait::async_trait;
use portfolio_core::error::FeedError;
use portfolio_core::traits::PriceFeed;
use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Yahoo feed configuration.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    /// Appended to tickers that carry no exchange suffix, e.g. `=X` for FX pairs
    pub ticker_suffix: String,
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            ticker_suffix: "=X".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl YahooConfig {
    /// Symbol as Yahoo knows it.
    pub fn symbol(&self, ticker: &str) -> String {
        if ticker.contains('=') || ticker.contains('.') {
            ticker.to_string()
        } else {
            format!("{}{}", ticker, self.ticker_suffix)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Extract the latest price from a chart response body.
///
/// Prefers `regularMarketPrice`, falling back to the last non-null close.
fn parse_chart(ticker: &str, body: &str) -> Result<Decimal, FeedError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| FeedError::fetch_failed(ticker, format!("invalid response: {}", e)))?;

    if let Some(error) = response.chart.error {
        return Err(FeedError::fetch_failed(
            ticker,
            format!(
                "{}: {}",
                error.code.unwrap_or_default(),
                error.description.unwrap_or_default()
            ),
        ));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FeedError::fetch_failed(ticker, "empty chart result"))?;

    let last_close = || {
        result
            .indicators
            .as_ref()
            .and_then(|i| i.quote.first())
            .and_then(|q| q.close.iter().rev().flatten().next().copied())
    };

    let price = result
        .meta
        .regular_market_price
        .or_else(last_close)
        .ok_or_else(|| FeedError::fetch_failed(ticker, "no price in response"))?;

    Decimal::from_f64(price)
        .filter(|p| *p > Decimal::ZERO)
        .ok_or_else(|| FeedError::fetch_failed(ticker, format!("unusable price {}", price)))
}

/// Latest-price feed backed by the Yahoo Finance chart endpoint.
pub struct YahooPriceFeed {
    config: YahooConfig,
    client: Client,
}

impl YahooPriceFeed {
    pub fn new(config: YahooConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("portfolio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl PriceFeed for YahooPriceFeed {
    async fn latest_price(&self, ticker: &str) -> Result<Decimal, FeedError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.symbol(ticker)
        );

        let resp = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1m")])
            .send()
            .await
            .map_err(|e| FeedError::fetch_failed(ticker, e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| FeedError::fetch_failed(ticker, e.to_string()))?;
        if !status.is_success() && !body.contains("\"chart\"") {
            return Err(FeedError::fetch_failed(ticker, format!("HTTP {}", status)));
        }

        let price = parse_chart(ticker, &body)?;
        debug!("{} latest price {}", ticker, price);
        Ok(price)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}
