//! CSV-backed portfolio store.

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use portfolio_core::error::StoreError;
use portfolio_core::traits::{PersistedPortfolio, PortfolioStore};
use portfolio_core::types::{Position, SettlementRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::atomic::write_atomic;
use crate::records::{LedgerRecord, SnapshotRecord, LEDGER_HEADERS, SNAPSHOT_HEADERS};
use crate::{HISTORY_FILE, PORTFOLIO_FILE};

/// Snapshot in `portfolio.csv`, settlement ledger in `transaction_history.csv`.
///
/// Both files are replaced atomically. The ledger is written before the
/// snapshot, so a crash in between leaves a snapshot that may still list a
/// position the ledger already settled; the engine reconciles that on load.
/// A settlement whose ticker and open time are already in the ledger is not
/// written again, so retrying a half-persisted tick stays idempotent.
#[derive(Debug, Clone)]
pub struct CsvPortfolioStore {
    portfolio_path: PathBuf,
    history_path: PathBuf,
}

impl CsvPortfolioStore {
    /// Create a store using the standard file names in the given directories.
    pub fn new(portfolio_dir: impl AsRef<Path>, history_dir: impl AsRef<Path>) -> Self {
        Self::with_paths(
            portfolio_dir.as_ref().join(PORTFOLIO_FILE),
            history_dir.as_ref().join(HISTORY_FILE),
        )
    }

    /// Create a store with explicit file paths.
    pub fn with_paths(portfolio_path: impl Into<PathBuf>, history_path: impl Into<PathBuf>) -> Self {
        Self {
            portfolio_path: portfolio_path.into(),
            history_path: history_path.into(),
        }
    }

    pub fn portfolio_path(&self) -> &Path {
        &self.portfolio_path
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    /// Ticker and open time of every settlement already in the ledger file.
    fn settled_keys(&self) -> Result<HashSet<(String, DateTime<Utc>)>, StoreError> {
        Ok(read_rows::<LedgerRecord>(&self.history_path)?
            .into_iter()
            .map(|r| (r.ticker, r.transaction_date))
            .collect())
    }

    fn append_history(&self, appended: &[&SettlementRecord]) -> io::Result<()> {
        let existing = match fs::read(&self.history_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        let has_content = existing.iter().any(|b| !b.is_ascii_whitespace());

        write_atomic(&self.history_path, |w| {
            if has_content {
                w.write_all(&existing)?;
                if existing.last() != Some(&b'\n') {
                    w.write_all(b"\n")?;
                }
                write_rows(w, None, appended.iter().map(|r| LedgerRecord::from(*r)))
            } else {
                write_rows(
                    w,
                    Some(&LEDGER_HEADERS[..]),
                    appended.iter().map(|r| LedgerRecord::from(*r)),
                )
            }
        })
    }

    fn write_snapshot(&self, taken_at: DateTime<Utc>, open: &[Position]) -> io::Result<()> {
        write_atomic(&self.portfolio_path, |w| {
            write_rows(
                w,
                Some(&SNAPSHOT_HEADERS[..]),
                open.iter().map(|p| SnapshotRecord::from_position(taken_at, p)),
            )
        })
    }
}

fn write_rows<R, I>(out: &mut BufWriter<File>, headers: Option<&[&str]>, rows: I) -> io::Result<()>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
    if let Some(headers) = headers {
        writer.write_record(headers).map_err(io::Error::other)?;
    }
    for row in rows {
        writer.serialize(row).map_err(io::Error::other)?;
    }
    writer.flush()
}

/// Read every row of a CSV file. A missing file has no rows.
fn read_rows<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::Unavailable(format!("{}: {}", path.display(), e))),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    reader
        .deserialize()
        .map(|row| {
            row.map_err(|e| StoreError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        })
        .collect()
}

impl PortfolioStore for CsvPortfolioStore {
    fn load(&self) -> Result<PersistedPortfolio, StoreError> {
        let open = read_rows::<SnapshotRecord>(&self.portfolio_path)?
            .into_iter()
            .map(SnapshotRecord::into_position)
            .collect::<Vec<_>>();
        let settled = read_rows::<LedgerRecord>(&self.history_path)?
            .into_iter()
            .map(SettlementRecord::from)
            .collect::<Vec<_>>();

        debug!(
            "Loaded {} open positions and {} settlements from {}",
            open.len(),
            settled.len(),
            self.portfolio_path.display()
        );
        Ok(PersistedPortfolio { open, settled })
    }

    fn persist(
        &self,
        taken_at: DateTime<Utc>,
        open: &[Position],
        appended: &[SettlementRecord],
    ) -> Result<(), StoreError> {
        let mut written = 0;
        if !appended.is_empty() {
            let settled = self.settled_keys()?;
            let (repeated, fresh): (Vec<&SettlementRecord>, Vec<&SettlementRecord>) = appended
                .iter()
                .partition(|r| settled.contains(&(r.ticker.clone(), r.opened_at)));
            for record in repeated {
                warn!(
                    ticker = %record.ticker,
                    opened_at = %record.opened_at,
                    "Settlement already in ledger, not appending"
                );
            }
            if !fresh.is_empty() {
                self.append_history(&fresh).map_err(|e| {
                    StoreError::Unavailable(format!("{}: {}", self.history_path.display(), e))
                })?;
            }
            written = fresh.len();
        }
        self.write_snapshot(taken_at, open).map_err(|e| {
            StoreError::Unavailable(format!("{}: {}", self.portfolio_path.display(), e))
        })?;

        debug!(
            "Persisted {} open positions, {} new settlements",
            open.len(),
            written
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use portfolio_core::types::{CloseAction, Direction, RiskState};
    use rust_decimal_macros::dec;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 14, minute, 0).unwrap()
    }

    fn position(ticker: &str, direction: Direction) -> Position {
        let mut position = Position::new(
            ticker.to_string(),
            direction,
            dec!(1.1),
            dec!(100),
            at(0),
            RiskState::opening(dec!(-0.23), dec!(0.27)),
        );
        position.mark(dec!(1.2));
        position
    }

    fn settlement(ticker: &str, closed_minute: u32) -> SettlementRecord {
        let mut record = SettlementRecord::from_position(
            &position(ticker, Direction::Long),
            CloseAction::TakeProfit,
            at(closed_minute),
        );
        record.profit_loss_pct = dec!(9.0909);
        record.monetary_gain_loss = dec!(272.727);
        record
    }

    #[test]
    fn test_load_missing_files_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPortfolioStore::new(dir.path(), dir.path());

        let loaded = store.load().unwrap();
        assert!(loaded.open.is_empty());
        assert!(loaded.settled.is_empty());
    }

    #[test]
    fn test_persist_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPortfolioStore::new(dir.path(), dir.path());
        let open = vec![position("EURUSD", Direction::Long), position("GBPUSD", Direction::Short)];

        store.persist(at(2), &open, &[settlement("USDJPY", 2)]).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.open, open);
        assert_eq!(loaded.settled.len(), 1);
        assert_eq!(loaded.settled[0].ticker, "USDJPY");
        assert_eq!(loaded.settled[0].action, CloseAction::TakeProfit);
        assert_eq!(loaded.settled[0].monetary_gain_loss, dec!(272.727));
    }

    #[test]
    fn test_history_only_grows() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPortfolioStore::new(dir.path(), dir.path());

        store.persist(at(2), &[], &[settlement("A", 2)]).unwrap();
        store.persist(at(4), &[], &[]).unwrap();
        store.persist(at(6), &[], &[settlement("B", 6), settlement("C", 6)]).unwrap();

        let loaded = store.load().unwrap();
        let tickers: Vec<_> = loaded.settled.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["A", "B", "C"]);

        let text = fs::read_to_string(store.history_path()).unwrap();
        assert_eq!(text.matches("Close Date").count(), 1);
    }

    #[test]
    fn test_snapshot_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPortfolioStore::new(dir.path(), dir.path());

        store.persist(at(2), &[position("EURUSD", Direction::Long)], &[]).unwrap();
        store.persist(at(4), &[], &[]).unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.open.is_empty());
        let text = fs::read_to_string(store.portfolio_path()).unwrap();
        assert!(text.starts_with("Timestamp,Ticker,Transaction Date"));
    }

    #[test]
    fn test_snapshot_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPortfolioStore::new(dir.path(), dir.path());

        store.persist(at(2), &[position("EURUSD", Direction::Long)], &[]).unwrap();

        let text = fs::read_to_string(store.portfolio_path()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("2024-05-01 14:02:00,EURUSD,2024-05-01 14:00:00,1.1,100,Long,1.2,"));
    }

    #[test]
    fn test_malformed_history_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPortfolioStore::new(dir.path(), dir.path());
        fs::write(
            store.history_path(),
            "Transaction Date,Close Date,Ticker\nnot a date,2024-05-01 14:00:00,EURUSD\n",
        )
        .unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::ParseError { .. }));
    }

    #[test]
    fn test_retry_after_failed_snapshot_does_not_repeat_settlement() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("snapshot");
        fs::write(&blocker, "file, not a directory").unwrap();
        let store = CsvPortfolioStore::with_paths(
            blocker.join(PORTFOLIO_FILE),
            dir.path().join(HISTORY_FILE),
        );
        let record = settlement("EURUSD", 2);

        // Ledger append lands, snapshot write does not.
        let err = store.persist(at(2), &[], &[record.clone()]).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(read_rows::<LedgerRecord>(store.history_path()).unwrap().len(), 1);

        fs::remove_file(&blocker).unwrap();
        let mut retried = record.clone();
        retried.closed_at = at(4);
        store.persist(at(4), &[], &[retried, settlement("GBPUSD", 4)]).unwrap();

        let loaded = store.load().unwrap();
        let tickers: Vec<_> = loaded.settled.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["EURUSD", "GBPUSD"]);
        assert_eq!(loaded.settled[0].closed_at, at(2));
    }

    #[test]
    fn test_unwritable_location_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let store = CsvPortfolioStore::new(&blocker, &blocker);

        let err = store.persist(at(2), &[], &[settlement("A", 2)]).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
