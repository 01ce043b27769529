//! Portfolio report generation.

use chrono::{DateTime, Utc};
use portfolio_core::types::{Position, SettlementRecord};
use portfolio_engine::PortfolioState;
use portfolio_risk::CapitalSummary;
use serde::Serialize;

const HEAVY_RULE: &str = "═══════════════════════════════════════════════════════════════════════════════\n";
const LIGHT_RULE: &str = "───────────────────────────────────────────────────────────────────────────────\n";

/// Point-in-time view of the portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub generated_at: DateTime<Utc>,
    pub capital: CapitalSummary,
    /// Open positions in ticker order
    pub open: Vec<Position>,
    /// Most recent settlements, oldest first
    pub recent: Vec<SettlementRecord>,
    pub settled_count: usize,
    pub wins: usize,
    pub losses: usize,
}

impl PortfolioReport {
    /// Build a report including the last `recent` settlements.
    pub fn from_state(state: &PortfolioState, recent: usize, generated_at: DateTime<Utc>) -> Self {
        let history = state.history();
        Self {
            generated_at,
            capital: state.capital(),
            open: state.open_positions(),
            recent: history.recent(recent).to_vec(),
            settled_count: history.len(),
            wins: history.wins(),
            losses: history.losses(),
        }
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(HEAVY_RULE);
        s.push_str(&format!(
            "  PORTFOLIO REPORT  {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        s.push_str(HEAVY_RULE);
        s.push('\n');

        s.push_str("CAPITAL\n");
        s.push_str(LIGHT_RULE);
        s.push_str(&format!("  Initial Value:       ${:.2}\n", self.capital.initial_value));
        s.push_str(&format!("  Total Value:         ${:.2}\n", self.capital.total_value));
        s.push_str(&format!("  Available Capital:   ${:.2}\n", self.capital.available_capital));
        s.push_str(&format!("  Open Exposure:       ${:.2}\n", self.capital.open_exposure));
        s.push_str(&format!("  Unrealized P/L:      ${:.2}\n", self.capital.unrealized_pl));
        s.push_str(&format!("  Realized P/L:        ${:.2}\n", self.capital.realized_pl));
        s.push('\n');

        s.push_str(&format!("OPEN POSITIONS ({})\n", self.open.len()));
        s.push_str(LIGHT_RULE);
        if self.open.is_empty() {
            s.push_str("  none\n");
        } else {
            s.push_str(&format!(
                "  {:<10} {:<6} {:>11} {:>11} {:>9} {:>11} {:>9} {:>9}\n",
                "Ticker", "Side", "Entry", "Current", "P/L %", "Gain/Loss", "Stop %", "Take %"
            ));
            for p in &self.open {
                s.push_str(&format!(
                    "  {:<10} {:<6} {:>11.5} {:>11.5} {:>9.3} {:>11.2} {:>9.3} {:>9.3}\n",
                    p.ticker(),
                    p.direction().to_string(),
                    p.entry_price(),
                    p.current_price(),
                    p.profit_loss_pct(),
                    p.monetary_gain_loss(),
                    p.stop_loss_pct(),
                    p.take_profit_pct(),
                ));
            }
        }
        s.push('\n');

        s.push_str(&format!(
            "SETTLEMENTS ({} total, {} won, {} lost)\n",
            self.settled_count, self.wins, self.losses
        ));
        s.push_str(LIGHT_RULE);
        if self.recent.is_empty() {
            s.push_str("  none\n");
        } else {
            for r in &self.recent {
                s.push_str(&format!(
                    "  {} {:<10} {:<6} {:>11.5} -> {:>11.5} {:>9.3}% {:>11.2}  {}\n",
                    r.closed_at.format("%Y-%m-%d %H:%M"),
                    r.ticker,
                    r.direction.to_string(),
                    r.entry_price,
                    r.close_price,
                    r.profit_loss_pct,
                    r.monetary_gain_loss,
                    r.action,
                ));
            }
        }
        s.push('\n');

        s.push_str(HEAVY_RULE);
        s
    }

    /// One-line summary for the tick log.
    pub fn headline(&self) -> String {
        format!(
            "value ${:.2}, available ${:.2}, {} open, {} settled",
            self.capital.total_value,
            self.capital.available_capital,
            self.open.len(),
            self.settled_count
        )
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use portfolio_core::types::{CloseAction, Direction};
    use portfolio_risk::EngineConfig;
    use rust_decimal_macros::dec;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 14, minute, 0).unwrap()
    }

    fn sample_state() -> PortfolioState {
        let config = EngineConfig::default();
        let mut state = PortfolioState::new(&config);
        state
            .open("EURUSD", Direction::Long, dec!(1.1), dec!(100), at(0))
            .unwrap();
        state
            .open("GBPUSD", Direction::Short, dec!(1.2), dec!(100), at(0))
            .unwrap();
        state.ledger_mut().refresh_price("GBPUSD", dec!(1.21));
        state.ledger_mut().recompute_all();
        state.close("GBPUSD", CloseAction::StopLoss, at(2)).unwrap();
        state
    }

    #[test]
    fn test_report_summary() {
        let report = PortfolioReport::from_state(&sample_state(), 5, at(2));
        let summary = report.summary();

        assert!(summary.contains("PORTFOLIO REPORT"));
        assert!(summary.contains("OPEN POSITIONS (1)"));
        assert!(summary.contains("EURUSD"));
        assert!(summary.contains("Closed (Stop Loss)"));
        assert!(summary.contains("1 total, 0 won, 1 lost"));
    }

    #[test]
    fn test_report_capital_matches_state() {
        let state = sample_state();
        let report = PortfolioReport::from_state(&state, 5, at(2));

        assert_eq!(report.capital.total_value, state.total_value());
        assert_eq!(report.capital.available_capital, state.available_capital());
        assert!(report.headline().contains("1 open, 1 settled"));
    }

    #[test]
    fn test_report_json() {
        let report = PortfolioReport::from_state(&sample_state(), 5, at(2));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["settled_count"], 1);
        assert_eq!(json["open"].as_array().unwrap().len(), 1);
    }
}
