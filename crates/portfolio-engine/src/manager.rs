//! Per-tick portfolio orchestration.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use portfolio_core::error::{PortfolioResult, StoreError};
use portfolio_core::traits::{Notifier, PortfolioStore, PriceFeed, SignalSource};
use portfolio_core::types::{Direction, SettlementRecord, SignalBook};
use portfolio_risk::{CapitalSummary, DecisionPolicy, EngineConfig, EntryDecision, ExitDecision};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::PortfolioState;

/// A position transition decided during a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PositionEvent {
    Opened {
        ticker: String,
        direction: Direction,
        entry_price: Decimal,
    },
    Closed(SettlementRecord),
}

impl PositionEvent {
    /// Human-readable notification text.
    pub fn message(&self) -> String {
        match self {
            PositionEvent::Opened {
                ticker,
                direction,
                entry_price,
            } => format!("Position opened: {} - {} at ${:.5}", ticker, direction, entry_price),
            PositionEvent::Closed(record) => format!(
                "Position closed: {} - {} at ${:.5} {}",
                record.ticker, record.direction, record.close_price, record.action
            ),
        }
    }
}

/// Outcome of one committed tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick_id: Uuid,
    pub at: DateTime<Utc>,
    /// Closes first, then opens, in decision order
    pub events: Vec<PositionEvent>,
    /// Tickers whose price could not be refreshed
    pub price_failures: Vec<String>,
    /// Tickers skipped for entry because their signal rows were unusable
    pub malformed_signals: Vec<String>,
    pub signals_read: usize,
    pub notification_failures: usize,
    /// Capital after the tick
    pub capital: CapitalSummary,
}

impl TickReport {
    pub fn opened(&self) -> impl Iterator<Item = &PositionEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, PositionEvent::Opened { .. }))
    }

    pub fn closed(&self) -> impl Iterator<Item = &SettlementRecord> {
        self.events.iter().filter_map(|e| match e {
            PositionEvent::Closed(record) => Some(record),
            PositionEvent::Opened { .. } => None,
        })
    }
}

/// Runs ticks against a portfolio using its collaborators.
pub struct PortfolioManager {
    config: EngineConfig,
    policy: DecisionPolicy,
    signals: Arc<dyn SignalSource>,
    feed: Arc<dyn PriceFeed>,
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn PortfolioStore>,
}

impl PortfolioManager {
    /// Create a new portfolio manager.
    pub fn new(
        config: EngineConfig,
        signals: Arc<dyn SignalSource>,
        feed: Arc<dyn PriceFeed>,
        notifier: Arc<dyn Notifier>,
        store: Arc<dyn PortfolioStore>,
    ) -> Self {
        let policy = DecisionPolicy::new(&config);
        Self {
            config,
            policy,
            signals,
            feed,
            notifier,
            store,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load the last committed portfolio from the store.
    pub fn load_state(&self) -> Result<PortfolioState, StoreError> {
        let persisted = self.store.load()?;
        let state = PortfolioState::restore(&self.config, persisted)?;
        info!(
            store = self.store.name(),
            open = state.ledger().len(),
            settled = state.history().len(),
            "Loaded portfolio"
        );
        Ok(state)
    }

    /// Run one tick at `now`.
    ///
    /// Work happens on a copy of `state`, which is replaced only after the
    /// store accepted the result. On error neither `state` nor the store has
    /// changed and no notification was sent.
    pub async fn tick(&self, state: &mut PortfolioState, now: DateTime<Utc>) -> PortfolioResult<TickReport> {
        let tick_id = Uuid::new_v4();
        self.run_tick(state, now, tick_id)
            .instrument(info_span!("tick", id = %tick_id))
            .await
    }

    async fn run_tick(
        &self,
        state: &mut PortfolioState,
        now: DateTime<Utc>,
        tick_id: Uuid,
    ) -> PortfolioResult<TickReport> {
        let book = self.read_signals().await;
        let mut next = state.clone();

        let price_failures = self.refresh_prices(&mut next).await;
        next.ledger_mut().recompute_all();

        let settled_before = next.history().len();
        let mut events = Vec::new();
        self.evaluate_closes(&mut next, &book, now, &mut events)?;
        self.evaluate_opens(&mut next, &book, now, &mut events)?;

        self.store
            .persist(now, &next.open_positions(), next.history().since(settled_before))?;
        *state = next;

        let notification_failures = self.notify(&events).await;
        let capital = state.capital();

        info!(
            open = state.ledger().len(),
            events = events.len(),
            total_value = %capital.total_value.round_dp(2),
            available_capital = %capital.available_capital.round_dp(2),
            "Tick committed"
        );

        Ok(TickReport {
            tick_id,
            at: now,
            events,
            price_failures,
            malformed_signals: book.malformed().cloned().collect(),
            signals_read: book.len(),
            notification_failures,
            capital,
        })
    }

    async fn read_signals(&self) -> SignalBook {
        match self.signals.latest().await {
            Ok(book) => {
                for ticker in book.malformed() {
                    warn!(ticker = %ticker, "Malformed signal rows, skipping entry");
                }
                book
            }
            Err(e) => {
                warn!(source = self.signals.name(), error = %e, "Signals unavailable, evaluating exits only");
                SignalBook::default()
            }
        }
    }

    /// Fetch prices for all open tickers. A failed ticker keeps its last price.
    async fn refresh_prices(&self, state: &mut PortfolioState) -> Vec<String> {
        let tickers: Vec<String> = state.ledger().tickers().map(str::to_string).collect();
        let quotes = join_all(tickers.iter().map(|ticker| self.feed.latest_price(ticker))).await;

        let mut failures = Vec::new();
        for (ticker, quote) in tickers.into_iter().zip(quotes) {
            match quote {
                Ok(price) if price > Decimal::ZERO => {
                    debug!(ticker = %ticker, %price, "Price refreshed");
                    state.ledger_mut().refresh_price(&ticker, price);
                }
                Ok(price) => {
                    warn!(ticker = %ticker, %price, "Non-positive price, keeping last known");
                    failures.push(ticker);
                }
                Err(e) => {
                    warn!(feed = self.feed.name(), error = %e, "Price fetch failed, keeping last known");
                    failures.push(ticker);
                }
            }
        }
        failures
    }

    fn evaluate_closes(
        &self,
        state: &mut PortfolioState,
        book: &SignalBook,
        now: DateTime<Utc>,
        events: &mut Vec<PositionEvent>,
    ) -> PortfolioResult<()> {
        let exits: Vec<_> = state
            .ledger()
            .list_open()
            .filter_map(|position| {
                match self.policy.exit_decision(position, book.get(position.ticker())) {
                    ExitDecision::Close(action) => Some((position.ticker().to_string(), action)),
                    ExitDecision::Hold => None,
                }
            })
            .collect();

        for (ticker, action) in exits {
            let record = state.close(&ticker, action, now)?;
            info!(
                ticker = %record.ticker,
                direction = %record.direction,
                close_price = %record.close_price,
                profit_loss_pct = %record.profit_loss_pct.round_dp(4),
                monetary_gain_loss = %record.monetary_gain_loss.round_dp(2),
                action = %record.action,
                "Position closed"
            );
            events.push(PositionEvent::Closed(record.clone()));
        }
        Ok(())
    }

    fn evaluate_opens(
        &self,
        state: &mut PortfolioState,
        book: &SignalBook,
        now: DateTime<Utc>,
        events: &mut Vec<PositionEvent>,
    ) -> PortfolioResult<()> {
        for signal in book.iter() {
            let available = state.available_capital();
            let already_open = state.ledger().contains(&signal.ticker);

            match self.policy.entry_decision(signal, available, already_open) {
                EntryDecision::Open {
                    direction,
                    entry_price,
                    investment_amount,
                } => {
                    state.open(&signal.ticker, direction, entry_price, investment_amount, now)?;
                    info!(
                        ticker = %signal.ticker,
                        %direction,
                        %entry_price,
                        %investment_amount,
                        total_evaluation = %signal.total_evaluation,
                        "Position opened"
                    );
                    events.push(PositionEvent::Opened {
                        ticker: signal.ticker.clone(),
                        direction,
                        entry_price,
                    });
                }
                EntryDecision::Rejected { reason } => {
                    debug!(ticker = %signal.ticker, %reason, "No entry");
                }
            }
        }
        Ok(())
    }

    async fn notify(&self, events: &[PositionEvent]) -> usize {
        let mut failures = 0;
        for event in events {
            if let Err(e) = self.notifier.send(&event.message()).await {
                warn!(sink = self.notifier.name(), error = %e, "Notification failed");
                failures += 1;
            }
        }
        failures
    }
}
