//! Shared data structures for the nowcasting pipeline
//!
//! - `reading`: RawReading (acquisition boundary), Reading, ReadingSeries
//! - `analysis`: TrendResult, StabilityResult, Alert, AnalysisSnapshot (primary cycle)
//! - `statistics`: StatisticalTrends (secondary cycle)

mod reading;
mod analysis;
mod statistics;

pub use reading::*;
pub use analysis::*;
pub use statistics::*;
