//! Fixed-interval tick scheduling.

use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

/// Yields tick slots on a fixed period.
///
/// The caller runs its tick between calls to [`Scheduler::next_tick`], so a
/// tick always completes before the next slot is awaited. A slot missed
/// because a tick overran is delayed, not bunched.
pub struct Scheduler {
    period: Duration,
    slots: IntervalStream,
}

impl Scheduler {
    /// Create a scheduler. The first slot is immediate.
    pub fn new(period: Duration) -> Self {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            period,
            slots: IntervalStream::new(timer),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next slot, or `None` once `shutdown` completes.
    pub async fn next_tick<S>(&mut self, shutdown: &mut S) -> Option<Instant>
    where
        S: Future + Unpin,
    {
        tokio::select! {
            biased;
            _ = shutdown => None,
            slot = self.slots.next() => slot,
        }
    }
}
