//! Refresh Scheduler
//!
//! Drives one [`AnalysisCycle`] on a fixed timer:
//!
//! ```text
//! Idle -> Fetching -> Analyzing -> Published -> Idle
//!            |            |
//!            +------------+--> (cancelled: Stale, failed fetch: Failed) -> Idle
//! ```
//!
//! Cycles of one scheduler run inline in its task, so they never overlap; a
//! slow cycle pushes back the next tick instead of stacking up. Cancellation
//! is checked after the fetch and again immediately before publish, and a
//! cancelled cycle never publishes.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cycle::AnalysisCycle;
use super::publisher::Publisher;
use crate::acquisition::{AcquisitionError, ReadingSource};
use crate::config::defaults::ACQUISITION_TIMEOUT_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleState {
    #[default]
    Idle,
    Fetching,
    Analyzing,
    Published,
}

impl std::fmt::Display for CycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleState::Idle => write!(f, "Idle"),
            CycleState::Fetching => write!(f, "Fetching"),
            CycleState::Analyzing => write!(f, "Analyzing"),
            CycleState::Published => write!(f, "Published"),
        }
    }
}

/// How a single cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A fresh result replaced the previous one.
    Published,
    /// Cancelled mid-cycle; the result (if any) was discarded.
    Stale,
    /// Acquisition failed; the previous result is kept.
    Failed(AcquisitionError),
}

impl CycleOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, CycleOutcome::Published)
    }
}

/// Running totals for one scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub cycles: u64,
    pub published: u64,
    pub stale: u64,
    pub failed: u64,
}

impl SchedulerStats {
    fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Published => self.published += 1,
            CycleOutcome::Stale => self.stale += 1,
            CycleOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct RefreshScheduler<C, P>
where
    C: AnalysisCycle,
    P: Publisher<C::Output>,
{
    cycle: C,
    source: Arc<dyn ReadingSource>,
    publisher: P,
    interval: Duration,
    fetch_timeout: Duration,
    cancel_token: CancellationToken,
    state: CycleState,
    stats: SchedulerStats,
}

impl<C, P> RefreshScheduler<C, P>
where
    C: AnalysisCycle,
    P: Publisher<C::Output>,
{
    pub fn new(
        cycle: C,
        source: Arc<dyn ReadingSource>,
        publisher: P,
        interval: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            cycle,
            source,
            publisher,
            interval,
            fetch_timeout: Duration::from_secs(ACQUISITION_TIMEOUT_SECS),
            cancel_token,
            state: CycleState::Idle,
            stats: SchedulerStats::default(),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    fn transition(&mut self, next: CycleState) {
        debug!("[{}] {} -> {}", self.cycle.name(), self.state, next);
        self.state = next;
    }

    /// Run one fetch/analyze/publish cycle.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let outcome = self.execute_cycle().await;
        self.stats.record(&outcome);
        if !outcome.is_published() {
            self.transition(CycleState::Idle);
        }
        outcome
    }

    async fn execute_cycle(&mut self) -> CycleOutcome {
        let name = self.cycle.name();
        let cancel = self.cancel_token.clone();
        if cancel.is_cancelled() {
            return CycleOutcome::Stale;
        }

        self.transition(CycleState::Fetching);
        let lookback_hours = self.cycle.lookback_hours();
        let fetch = tokio::time::timeout(self.fetch_timeout, self.source.fetch(lookback_hours));

        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = fetch => Some(result),
        };

        let rows = match fetched {
            None => {
                debug!("[{}] Cancelled during fetch, discarding cycle", name);
                return CycleOutcome::Stale;
            }
            Some(Err(_elapsed)) => {
                let e = AcquisitionError::Timeout(self.fetch_timeout);
                warn!("[{}] Fetch from {} failed: {}", name, self.source.source_name(), e);
                return CycleOutcome::Failed(e);
            }
            Some(Ok(Err(e))) => {
                warn!("[{}] Fetch from {} failed: {}", name, self.source.source_name(), e);
                return CycleOutcome::Failed(e);
            }
            Some(Ok(Ok(rows))) => rows,
        };

        if cancel.is_cancelled() {
            debug!("[{}] Cancelled after fetch, discarding {} rows", name, rows.len());
            return CycleOutcome::Stale;
        }

        self.transition(CycleState::Analyzing);
        let output = self.cycle.analyze(&rows);

        // Staleness guard: nothing is published once the token is cancelled
        if cancel.is_cancelled() {
            debug!("[{}] Cancelled before publish, discarding result", name);
            return CycleOutcome::Stale;
        }

        self.publisher.publish(output);
        self.transition(CycleState::Published);
        debug!("[{}] Published result from {} rows", name, rows.len());
        CycleOutcome::Published
    }

    /// Tick until cancelled. The first cycle starts immediately.
    pub async fn run(mut self) -> SchedulerStats {
        let name = self.cycle.name();
        let cancel = self.cancel_token.clone();
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "[{}] Scheduler starting with interval {:?} (source: {}, look-back {}h)",
            name,
            self.interval,
            self.source.source_name(),
            self.cycle.lookback_hours()
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(
                        "[{}] Received shutdown signal after {} cycles ({} published, {} failed)",
                        name, self.stats.cycles, self.stats.published, self.stats.failed
                    );
                    break;
                }
                _ = interval.tick() => {
                    if let CycleOutcome::Failed(e) = self.run_cycle().await {
                        debug!("[{}] Keeping previous result after failure: {}", name, e);
                    }
                    if self.state == CycleState::Published {
                        self.transition(CycleState::Idle);
                    }
                }
            }
        }

        self.stats
    }
}
