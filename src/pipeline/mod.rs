//! Refresh Pipeline
//!
//! ```text
//! timer tick -> ReadingSource::fetch -> AnalysisCycle::analyze -> Publisher::publish
//! ```
//!
//! Two independent schedulers run in the host: the primary cycle (60 s,
//! `AnalysisSnapshot`) and the trends cycle (300 s, `StatisticalTrends`).
//! They share no mutable state; each owns its own publish slot and a clone of
//! the cancellation token.

pub mod cycle;
pub mod publisher;
pub mod scheduler;

pub use cycle::{AnalysisCycle, PrimaryCycle, TrendsCycle};
pub use publisher::{Publisher, SnapshotStore};
pub use scheduler::{CycleOutcome, CycleState, RefreshScheduler, SchedulerStats};
