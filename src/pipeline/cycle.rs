//! The two refresh cycles and what each one computes.

use crate::analysis::{NowcastAnalyzer, StatisticalTrendsAnalyzer};
use crate::config::NowcastConfig;
use crate::types::{AnalysisSnapshot, RawReading, StatisticalTrends};

/// The CPU-bound half of a refresh cycle.
///
/// Implementations are pure: the same rows always produce an equivalent
/// result, and nothing is carried between calls.
pub trait AnalysisCycle: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    /// Name used as the log prefix, e.g. `[PrimaryRefresh]`.
    fn name(&self) -> &'static str;

    /// Look-back requested from the source each cycle.
    fn lookback_hours(&self) -> u32;

    fn analyze(&self, rows: &[RawReading]) -> Self::Output;
}

// ============================================================================
// Primary Cycle
// ============================================================================

/// Fast cycle: trends, stability and alerts.
#[derive(Debug, Clone)]
pub struct PrimaryCycle {
    analyzer: NowcastAnalyzer,
    lookback_hours: u32,
}

impl PrimaryCycle {
    pub fn new(analyzer: NowcastAnalyzer, lookback_hours: u32) -> Self {
        Self {
            analyzer,
            lookback_hours,
        }
    }

    pub fn from_config(config: &NowcastConfig) -> Self {
        Self::new(
            NowcastAnalyzer::new(config.analysis.clone(), config.alerts.clone()),
            config.source.primary_lookback_hours,
        )
    }
}

impl AnalysisCycle for PrimaryCycle {
    type Output = AnalysisSnapshot;

    fn name(&self) -> &'static str {
        "PrimaryRefresh"
    }

    fn lookback_hours(&self) -> u32 {
        self.lookback_hours
    }

    fn analyze(&self, rows: &[RawReading]) -> AnalysisSnapshot {
        self.analyzer.analyze(rows)
    }
}

// ============================================================================
// Trends Cycle
// ============================================================================

/// Slow cycle: moving averages, deviations and pressure correlations.
#[derive(Debug, Clone)]
pub struct TrendsCycle {
    analyzer: StatisticalTrendsAnalyzer,
    lookback_hours: u32,
}

impl TrendsCycle {
    pub fn new(analyzer: StatisticalTrendsAnalyzer, lookback_hours: u32) -> Self {
        Self {
            analyzer,
            lookback_hours,
        }
    }

    pub fn from_config(config: &NowcastConfig) -> Self {
        Self::new(
            StatisticalTrendsAnalyzer::new(config.statistics.clone()),
            config.source.trends_lookback_hours,
        )
    }
}

impl AnalysisCycle for TrendsCycle {
    type Output = StatisticalTrends;

    fn name(&self) -> &'static str {
        "TrendsRefresh"
    }

    fn lookback_hours(&self) -> u32 {
        self.lookback_hours
    }

    fn analyze(&self, rows: &[RawReading]) -> StatisticalTrends {
        self.analyzer.analyze(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_follow_config() {
        let mut config = NowcastConfig::default();
        config.source.primary_lookback_hours = 24;
        config.source.trends_lookback_hours = 48;

        assert_eq!(PrimaryCycle::from_config(&config).lookback_hours(), 24);
        assert_eq!(TrendsCycle::from_config(&config).lookback_hours(), 48);
    }

    #[test]
    fn test_default_lookbacks() {
        let config = NowcastConfig::default();
        assert_eq!(PrimaryCycle::from_config(&config).lookback_hours(), 72);
        assert_eq!(TrendsCycle::from_config(&config).lookback_hours(), 120);
    }

    #[test]
    fn test_empty_rows_never_panic() {
        let config = NowcastConfig::default();
        let snapshot = PrimaryCycle::from_config(&config).analyze(&[]);
        assert_eq!(snapshot.alerts.len(), 1);
        let trends = TrendsCycle::from_config(&config).analyze(&[]);
        assert_eq!(trends.row_count, 0);
    }
}
