//! Logging setup and portfolio reporting.

mod logging;
mod report;

pub use logging::setup_logging;
pub use report::PortfolioReport;
