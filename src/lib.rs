//! weather-nowcast: short-horizon nowcasting over a local weather station feed
//!
//! Ingests a rolling window of pressure/temperature/humidity readings and
//! derives pressure-trend patterns, dewpoint-based stability and alerts.
//!
//! ## Architecture
//!
//! - **Acquisition**: CSV over HTTP, file replay or synthetic data
//! - **Analysis**: trend windows, dewpoint, statistics, alert rules
//! - **Pipeline**: two independent refresh schedulers with cancellation and
//!   atomic publish

pub mod acquisition;
pub mod analysis;
pub mod config;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::NowcastConfig;

// Re-export commonly used types
pub use types::{
    Alert, AlertSeverity, AnalysisSnapshot, Correlation, PressurePattern, PressureTrends,
    RawReading, Reading, ReadingSeries, StabilityResult, StabilityTrend, StatisticalTrends,
    TrendResult,
};

// Re-export analyzers
pub use analysis::{AlertEngine, NowcastAnalyzer, StatisticalTrendsAnalyzer, TrendAnalyzer};

// Re-export acquisition
pub use acquisition::{AcquisitionError, ReadingSource};

// Re-export pipeline
pub use pipeline::{
    AnalysisCycle, CycleOutcome, PrimaryCycle, Publisher, RefreshScheduler, SnapshotStore,
    TrendsCycle,
};
