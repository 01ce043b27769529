//! Signal source reading the newest `signals_*.csv` file.

use async_trait::async_trait;
use csv::ReaderBuilder;
use portfolio_core::error::SignalError;
use portfolio_core::traits::SignalSource;
use portfolio_core::types::{SignalBook, SignalRow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use crate::records::decimal;

const FILE_PREFIX: &str = "signals_";
const FILE_EXTENSION: &str = "csv";

/// Raw signal row. Every field is optional so one bad row only taints its ticker.
#[derive(Debug, Deserialize)]
struct RawSignalRow {
    #[serde(rename = "Ticker", default)]
    ticker: Option<String>,
    #[serde(rename = "Interval", default)]
    interval: Option<String>,
    #[serde(rename = "Evaluation", default)]
    evaluation: Option<String>,
    #[serde(rename = "MACD-Price Evaluation", default)]
    macd_price_evaluation: Option<String>,
    #[serde(rename = "RECENT PRICE", alias = "RecentPrice", default)]
    recent_price: Option<String>,
}

impl RawSignalRow {
    fn into_row(self) -> Option<SignalRow> {
        let ticker = self.ticker?.trim().to_string();
        if ticker.is_empty() {
            return None;
        }
        let number = |field: Option<String>| field.as_deref().and_then(decimal::parse);

        Some(SignalRow {
            interval: self.interval.as_deref().and_then(|s| s.parse().ok()),
            evaluation: number(self.evaluation),
            macd_price_evaluation: number(self.macd_price_evaluation),
            recent_price: number(self.recent_price),
            ticker,
        })
    }
}

/// Reads the most recently modified `signals_*.csv` in a directory.
pub struct CsvSignalSource {
    dir: PathBuf,
}

impl CsvSignalSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Locate the newest signal file. Ties on modification time go to the
    /// lexicographically greater name.
    pub fn latest_file(&self) -> Result<PathBuf, SignalError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| SignalError::Unavailable(format!("{}: {}", self.dir.display(), e)))?;

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_signal_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(FILE_PREFIX))
                .unwrap_or(false)
                && path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION);
            if !is_signal_file {
                continue;
            }

            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let replace = match &newest {
                None => true,
                Some((time, best)) => modified > *time || (modified == *time && path > *best),
            };
            if replace {
                newest = Some((modified, path));
            }
        }

        newest
            .map(|(_, path)| path)
            .ok_or_else(|| SignalError::NoSignalFile(self.dir.clone()))
    }

    /// Parse a signal file into rows.
    fn read_rows(path: &Path) -> Result<Vec<SignalRow>, SignalError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| SignalError::ParseError(format!("{}: {}", path.display(), e)))?;

        let mut rows = Vec::new();
        for result in reader.deserialize::<RawSignalRow>() {
            match result {
                Ok(raw) => rows.extend(raw.into_row()),
                Err(e) => warn!("Skipping unreadable signal row in {}: {}", path.display(), e),
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl SignalSource for CsvSignalSource {
    async fn latest(&self) -> Result<SignalBook, SignalError> {
        let path = self.latest_file()?;
        let rows = Self::read_rows(&path)?;
        let book = SignalBook::from_rows(rows);

        debug!(
            "Read {} signals ({} malformed) from {}",
            book.len(),
            book.malformed().count(),
            path.display()
        );
        Ok(book)
    }

    fn name(&self) -> &str {
        "CSV signals"
    }
}
