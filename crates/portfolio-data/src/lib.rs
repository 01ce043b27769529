//! Signal files and durable portfolio storage.

mod atomic;
mod csv_signals;
mod csv_store;
mod memory;
mod records;

pub use csv_signals::CsvSignalSource;
pub use csv_store::CsvPortfolioStore;
pub use memory::MemoryStore;

/// File name of the open-position snapshot.
pub const PORTFOLIO_FILE: &str = "portfolio.csv";

/// File name of the settlement ledger.
pub const HISTORY_FILE: &str = "transaction_history.csv";
