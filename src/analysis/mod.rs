//! Analytical core
//!
//! Pure, synchronous computation over one cycle's readings:
//!
//! - [`stats`]: mean, population std dev, Pearson correlation, moving average
//! - [`dewpoint`]: Magnus-formula dewpoint
//! - [`trend`]: multi-window pressure trends and temperature/humidity stability
//! - [`alerts`]: threshold alert rules
//! - [`analyzer`]: primary-cycle snapshot assembly
//! - [`statistical_trends`]: trends-cycle statistics over the raw columns
//!
//! Nothing here performs I/O or keeps state between calls.

pub mod alerts;
pub mod analyzer;
pub mod dewpoint;
pub mod statistical_trends;
pub mod stats;
pub mod trend;

pub use alerts::AlertEngine;
pub use analyzer::{AnalysisError, NowcastAnalyzer};
pub use dewpoint::{dewpoint, dewpoint_spread};
pub use statistical_trends::StatisticalTrendsAnalyzer;
pub use stats::StatsError;
pub use trend::TrendAnalyzer;
