//! Upstream signal rows and their per-ticker aggregate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::Interval;

/// One row of the upstream signal table, keyed by `(ticker, interval)`.
///
/// Numeric fields are optional so that a malformed row can still be
/// attributed to its ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub ticker: String,
    pub interval: Option<Interval>,
    pub evaluation: Option<Decimal>,
    pub macd_price_evaluation: Option<Decimal>,
    pub recent_price: Option<Decimal>,
}

/// Per-ticker signal used by the decision layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSignal {
    pub ticker: String,
    /// `Evaluation` plus the sum of `MACD-Price Evaluation` over all intervals
    pub total_evaluation: Decimal,
    /// Candidate entry price from the finest-granularity row
    pub reference_price: Decimal,
}

/// All aggregated signals for one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalBook {
    signals: BTreeMap<String, AggregatedSignal>,
    malformed: BTreeSet<String>,
}

#[derive(Default)]
struct Accumulator {
    evaluation: Option<Decimal>,
    macd_sum: Decimal,
    malformed: bool,
    reference: Option<(Option<Interval>, Option<Decimal>)>,
}

impl Accumulator {
    fn prefers(&self, interval: Option<Interval>) -> bool {
        match (&self.reference, interval) {
            (None, _) => true,
            (Some((None, _)), Some(_)) => true,
            (Some((Some(best), _)), Some(candidate)) => candidate.is_finer_than(best),
            (Some(_), None) => false,
        }
    }
}

impl SignalBook {
    /// Aggregate raw rows per ticker.
    ///
    /// The first row of a ticker supplies `Evaluation`; every row contributes
    /// its `MACD-Price Evaluation`. A ticker with any missing figure, or without
    /// a positive reference price, is recorded as malformed instead.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = SignalRow>,
    {
        let mut accumulators: BTreeMap<String, Accumulator> = BTreeMap::new();

        for row in rows {
            let ticker = row.ticker.trim();
            if ticker.is_empty() {
                continue;
            }

            let first = !accumulators.contains_key(ticker);
            let acc = accumulators.entry(ticker.to_string()).or_default();

            if first {
                match row.evaluation {
                    Some(evaluation) => acc.evaluation = Some(evaluation),
                    None => acc.malformed = true,
                }
            }

            match row.macd_price_evaluation {
                Some(value) => acc.macd_sum += value,
                None => acc.malformed = true,
            }

            if acc.prefers(row.interval) {
                acc.reference = Some((row.interval, row.recent_price));
            }
        }

        let mut book = SignalBook::default();
        for (ticker, acc) in accumulators {
            let reference_price = acc.reference.and_then(|(_, price)| price);
            match (acc.malformed, acc.evaluation, reference_price) {
                (false, Some(evaluation), Some(price)) if price > Decimal::ZERO => {
                    book.signals.insert(
                        ticker.clone(),
                        AggregatedSignal {
                            ticker,
                            total_evaluation: evaluation + acc.macd_sum,
                            reference_price: price,
                        },
                    );
                }
                _ => {
                    book.malformed.insert(ticker);
                }
            }
        }
        book
    }

    /// Get the aggregated signal for a ticker, if it is well formed.
    pub fn get(&self, ticker: &str) -> Option<&AggregatedSignal> {
        self.signals.get(ticker)
    }

    /// Iterate well-formed signals in ticker order.
    pub fn iter(&self) -> impl Iterator<Item = &AggregatedSignal> {
        self.signals.values()
    }

    /// Whether the ticker had rows this tick that could not be used.
    pub fn is_malformed(&self, ticker: &str) -> bool {
        self.malformed.contains(ticker)
    }

    pub fn malformed(&self) -> impl Iterator<Item = &String> {
        self.malformed.iter()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(
        ticker: &str,
        interval: Interval,
        evaluation: Decimal,
        macd: Decimal,
        price: Decimal,
    ) -> SignalRow {
        SignalRow {
            ticker: ticker.to_string(),
            interval: Some(interval),
            evaluation: Some(evaluation),
            macd_price_evaluation: Some(macd),
            recent_price: Some(price),
        }
    }

    #[test]
    fn test_total_evaluation_sums_macd_over_intervals() {
        let book = SignalBook::from_rows(vec![
            row("EURUSD", Interval::Hour1, dec!(30), dec!(10), dec!(1.1010)),
            row("EURUSD", Interval::Minute15, dec!(30), dec!(15), dec!(1.1005)),
            row("EURUSD", Interval::Daily, dec!(30), dec!(-5), dec!(1.1030)),
        ]);

        let signal = book.get("EURUSD").unwrap();
        assert_eq!(signal.total_evaluation, dec!(50));
        assert_eq!(signal.reference_price, dec!(1.1005));
    }

    #[test]
    fn test_finest_interval_wins_regardless_of_order() {
        let book = SignalBook::from_rows(vec![
            row("USDJPY", Interval::Minute5, dec!(0), dec!(0), dec!(150.10)),
            row("USDJPY", Interval::Minute15, dec!(0), dec!(0), dec!(150.20)),
        ]);
        assert_eq!(book.get("USDJPY").unwrap().reference_price, dec!(150.10));
    }

    #[test]
    fn test_missing_field_marks_ticker_malformed() {
        let mut bad = row("GBPUSD", Interval::Hour1, dec!(60), dec!(5), dec!(1.25));
        bad.macd_price_evaluation = None;

        let book = SignalBook::from_rows(vec![
            row("GBPUSD", Interval::Minute15, dec!(60), dec!(5), dec!(1.25)),
            bad,
            row("EURUSD", Interval::Minute15, dec!(10), dec!(5), dec!(1.1)),
        ]);

        assert!(book.get("GBPUSD").is_none());
        assert!(book.is_malformed("GBPUSD"));
        assert!(book.get("EURUSD").is_some());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_missing_reference_price_is_malformed() {
        let mut no_price = row("AUDUSD", Interval::Minute15, dec!(80), dec!(0), dec!(0));
        no_price.recent_price = None;

        let book = SignalBook::from_rows(vec![no_price]);
        assert!(book.is_malformed("AUDUSD"));
    }

    #[test]
    fn test_blank_ticker_rows_ignored() {
        let book = SignalBook::from_rows(vec![row(" ", Interval::Minute15, dec!(1), dec!(1), dec!(1))]);
        assert!(book.is_empty());
        assert_eq!(book.malformed().count(), 0);
    }
}
