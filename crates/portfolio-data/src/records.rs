//! CSV row layouts of the snapshot and settlement ledger files.

use chrono::{DateTime, Utc};
use portfolio_core::types::{CloseAction, Direction, Position, RiskState, SettlementRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Timestamps as `%Y-%m-%d %H:%M:%S`, with fractional seconds only when
/// present so a stored time reads back exactly. A few other layouts are
/// accepted on read.
pub(crate) mod datetime {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in [FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y/%m/%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Some(dt.and_utc());
            }
        }
        None
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

/// Decimals as plain strings; scientific notation is accepted on read.
pub(crate) mod decimal {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn parse(value: &str) -> Option<Decimal> {
        let value = value.trim();
        Decimal::from_str(value)
            .or_else(|_| Decimal::from_scientific(value))
            .ok()
    }

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.normalize().to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid number: {}", raw)))
    }
}

pub(crate) const SNAPSHOT_HEADERS: [&str; 13] = [
    "Timestamp",
    "Ticker",
    "Transaction Date",
    "Transaction Price",
    "Investment Amount",
    "Position",
    "Current Price",
    "Profit/Loss",
    "Monetary Gain/Loss",
    "Take Profit",
    "Stop Loss",
    "Min Profit/Loss",
    "Max Profit/Loss",
];

pub(crate) const LEDGER_HEADERS: [&str; 12] = [
    "Transaction Date",
    "Close Date",
    "Ticker",
    "Transaction Price",
    "Investment Amount",
    "Position",
    "Current Price",
    "Profit/Loss",
    "Monetary Gain/Loss",
    "Min Profit/Loss",
    "Max Profit/Loss",
    "Action",
];

/// One row of `portfolio.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SnapshotRecord {
    #[serde(rename = "Timestamp", with = "datetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Transaction Date", with = "datetime")]
    pub transaction_date: DateTime<Utc>,
    #[serde(rename = "Transaction Price", with = "decimal")]
    pub transaction_price: Decimal,
    #[serde(rename = "Investment Amount", with = "decimal")]
    pub investment_amount: Decimal,
    #[serde(rename = "Position")]
    pub position: Direction,
    #[serde(rename = "Current Price", with = "decimal")]
    pub current_price: Decimal,
    #[serde(rename = "Profit/Loss", with = "decimal")]
    pub profit_loss: Decimal,
    #[serde(rename = "Monetary Gain/Loss", with = "decimal")]
    pub monetary_gain_loss: Decimal,
    #[serde(rename = "Take Profit", with = "decimal")]
    pub take_profit: Decimal,
    #[serde(rename = "Stop Loss", with = "decimal")]
    pub stop_loss: Decimal,
    #[serde(rename = "Min Profit/Loss", with = "decimal")]
    pub min_profit_loss: Decimal,
    #[serde(rename = "Max Profit/Loss", with = "decimal")]
    pub max_profit_loss: Decimal,
}

impl SnapshotRecord {
    pub fn from_position(taken_at: DateTime<Utc>, position: &Position) -> Self {
        Self {
            timestamp: taken_at,
            ticker: position.ticker().to_string(),
            transaction_date: position.opened_at(),
            transaction_price: position.entry_price(),
            investment_amount: position.investment_amount(),
            position: position.direction(),
            current_price: position.current_price(),
            profit_loss: position.profit_loss_pct(),
            monetary_gain_loss: position.monetary_gain_loss(),
            take_profit: position.take_profit_pct(),
            stop_loss: position.stop_loss_pct(),
            min_profit_loss: position.min_profit_loss_pct(),
            max_profit_loss: position.max_profit_loss_pct(),
        }
    }

    pub fn into_position(self) -> Position {
        Position::restore(
            self.ticker,
            self.position,
            self.transaction_price,
            self.investment_amount,
            self.transaction_date,
            self.current_price,
            RiskState {
                profit_loss_pct: self.profit_loss,
                monetary_gain_loss: self.monetary_gain_loss,
                min_profit_loss_pct: self.min_profit_loss,
                max_profit_loss_pct: self.max_profit_loss,
                stop_loss_pct: self.stop_loss,
                take_profit_pct: self.take_profit,
            },
        )
    }
}

/// One row of `transaction_history.csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LedgerRecord {
    #[serde(rename = "Transaction Date", with = "datetime")]
    pub transaction_date: DateTime<Utc>,
    #[serde(rename = "Close Date", with = "datetime")]
    pub close_date: DateTime<Utc>,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Transaction Price", with = "decimal")]
    pub transaction_price: Decimal,
    #[serde(rename = "Investment Amount", with = "decimal")]
    pub investment_amount: Decimal,
    #[serde(rename = "Position")]
    pub position: Direction,
    #[serde(rename = "Current Price", with = "decimal")]
    pub current_price: Decimal,
    #[serde(rename = "Profit/Loss", with = "decimal")]
    pub profit_loss: Decimal,
    #[serde(rename = "Monetary Gain/Loss", with = "decimal")]
    pub monetary_gain_loss: Decimal,
    #[serde(rename = "Min Profit/Loss", with = "decimal")]
    pub min_profit_loss: Decimal,
    #[serde(rename = "Max Profit/Loss", with = "decimal")]
    pub max_profit_loss: Decimal,
    #[serde(rename = "Action")]
    pub action: CloseAction,
}

impl From<&SettlementRecord> for LedgerRecord {
    fn from(record: &SettlementRecord) -> Self {
        Self {
            transaction_date: record.opened_at,
            close_date: record.closed_at,
            ticker: record.ticker.clone(),
            transaction_price: record.entry_price,
            investment_amount: record.investment_amount,
            position: record.direction,
            current_price: record.close_price,
            profit_loss: record.profit_loss_pct,
            monetary_gain_loss: record.monetary_gain_loss,
            min_profit_loss: record.min_profit_loss_pct,
            max_profit_loss: record.max_profit_loss_pct,
            action: record.action,
        }
    }
}

impl From<LedgerRecord> for SettlementRecord {
    fn from(record: LedgerRecord) -> Self {
        Self {
            ticker: record.ticker,
            direction: record.position,
            entry_price: record.transaction_price,
            investment_amount: record.investment_amount,
            opened_at: record.transaction_date,
            closed_at: record.close_date,
            close_price: record.current_price,
            profit_loss_pct: record.profit_loss,
            monetary_gain_loss: record.monetary_gain_loss,
            min_profit_loss_pct: record.min_profit_loss,
            max_profit_loss_pct: record.max_profit_loss,
            action: record.action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_timestamp_layouts() {
        assert!(datetime::parse("2024-05-01 14:02:00").is_some());
        assert!(datetime::parse("2024-05-01 14:02:00.123456").is_some());
        assert!(datetime::parse("2024-05-01T14:02:00Z").is_some());
        assert!(datetime::parse("yesterday").is_none());
    }

    #[test]
    fn test_subsecond_timestamp_reads_back_exactly() {
        let whole = datetime::parse("2024-05-01 14:02:00").unwrap();
        assert_eq!(whole.format(datetime::FORMAT).to_string(), "2024-05-01 14:02:00");

        let precise = whole + chrono::Duration::microseconds(250_500);
        let written = precise.format(datetime::FORMAT).to_string();
        assert_eq!(written, "2024-05-01 14:02:00.250500");
        assert_eq!(datetime::parse(&written), Some(precise));
    }

    #[test]
    fn test_parse_decimal_layouts() {
        assert_eq!(decimal::parse("1.10000"), Some(dec!(1.10000)));
        assert_eq!(decimal::parse(" -0.23 "), Some(dec!(-0.23)));
        assert_eq!(decimal::parse("1e-05"), Some(dec!(0.00001)));
        assert_eq!(decimal::parse(""), None);
    }
}
