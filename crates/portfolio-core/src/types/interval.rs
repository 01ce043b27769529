//! Observation intervals of upstream signal rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sampling interval a signal row was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

impl Interval {
    /// Get the duration of the interval in seconds.
    pub fn as_secs(&self) -> u64 {
        match self {
            Interval::Minute1 => 60,
            Interval::Minute5 => 300,
            Interval::Minute15 => 900,
            Interval::Minute30 => 1800,
            Interval::Hour1 => 3600,
            Interval::Hour4 => 14400,
            Interval::Daily => 86400,
            Interval::Weekly => 604800,
            Interval::Monthly => 2592000, // Approximate (30 days)
        }
    }

    /// Whether this interval has finer granularity than `other`.
    pub fn is_finer_than(&self, other: &Interval) -> bool {
        self.as_secs() < other.as_secs()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Hour4 => "4h",
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "1M" is month, "1m" is minute
        if s.trim() == "1M" {
            return Ok(Interval::Monthly);
        }
        match s.trim().to_lowercase().as_str() {
            "1m" | "1min" => Ok(Interval::Minute1),
            "5m" | "5min" => Ok(Interval::Minute5),
            "15m" | "15min" => Ok(Interval::Minute15),
            "30m" | "30min" => Ok(Interval::Minute30),
            "1h" | "60m" | "1hour" => Ok(Interval::Hour1),
            "4h" | "4hour" => Ok(Interval::Hour4),
            "1d" | "day" | "daily" => Ok(Interval::Daily),
            "1wk" | "1w" | "weekly" => Ok(Interval::Weekly),
            "1mo" | "monthly" => Ok(Interval::Monthly),
            _ => Err(format!("Invalid interval: {}", s)),
        }
    }
}
