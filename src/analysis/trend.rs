//! Pressure Trend & Stability Analyzer
//!
//! Computes pressure rate of change over three trailing windows and the
//! temperature/humidity stability picture over a fourth.
//!
//! ## Window Rate
//! For each adjacent pair in a window:
//! `rate_i = (p_i - p_{i-1}) / elapsed_hours(t_{i-1}, t_i)`
//! The window rate is the arithmetic mean of the pairwise rates.
//!
//! Pairs with zero (or negative) elapsed time have no defined rate and are
//! skipped. A window with no usable pair reports a zero, stable trend.
//!
//! ## Thresholds
//! A rate must exceed a threshold by more than [`THRESHOLD_TOLERANCE`] to
//! cross it. A window stepping exactly 0.06 hPa each hour averages to
//! 0.0600000000000023 in floating point and still classifies as a rise.

use crate::config::AnalysisConfig;
use crate::types::{
    elapsed_hours, Correlation, PressurePattern, PressureTrends, Reading, ReadingSeries,
    StabilityResult, StabilityTrend, TrendResult,
};

use super::dewpoint::dewpoint;
use super::stats;

/// Slack applied to every rate threshold comparison (hPa/hour or °C/hour).
pub const THRESHOLD_TOLERANCE: f64 = 1e-9;

/// `true` when `magnitude` is strictly above `threshold`, ignoring float noise.
pub fn exceeds(magnitude: f64, threshold: f64) -> bool {
    magnitude - threshold > THRESHOLD_TOLERANCE
}

/// Multi-window pressure trend and stability analyzer.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    config: AnalysisConfig,
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl TrendAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Short, medium and long-term trends from the tail of the series.
    pub fn pressure_trends(&self, series: &ReadingSeries) -> PressureTrends {
        PressureTrends {
            short_term: self.window_trend(series.tail(self.config.short_term_window)),
            medium_term: self.window_trend(series.tail(self.config.medium_term_window)),
            long_term: self.window_trend(series.tail(self.config.long_term_window)),
        }
    }

    /// Trend over one window of time-ordered readings.
    pub fn window_trend(&self, readings: &[Reading]) -> TrendResult {
        match Self::window_rate(readings) {
            Some(rate) => TrendResult {
                rate,
                pattern: self.classify(rate),
            },
            None => TrendResult::stable(),
        }
    }

    /// Mean of adjacent pairwise rates (hPa/hour).
    ///
    /// `None` when fewer than two readings exist or every pair shares a
    /// timestamp.
    pub fn window_rate(readings: &[Reading]) -> Option<f64> {
        let rates: Vec<f64> = readings
            .windows(2)
            .filter_map(|pair| {
                let hours = elapsed_hours(pair[0].timestamp, pair[1].timestamp);
                (hours > 0.0).then(|| (pair[1].pressure - pair[0].pressure) / hours)
            })
            .collect();

        stats::mean(&rates).ok()
    }

    /// Strict on both thresholds: a rate on a threshold (within
    /// [`THRESHOLD_TOLERANCE`]) falls in the lower band.
    pub fn classify(&self, rate: f64) -> PressurePattern {
        let magnitude = rate.abs();
        if exceeds(magnitude, self.config.rapid_change_hpa_per_hour) {
            if rate > 0.0 {
                PressurePattern::RapidRise
            } else {
                PressurePattern::RapidFall
            }
        } else if exceeds(magnitude, self.config.change_hpa_per_hour) {
            if rate > 0.0 {
                PressurePattern::Rise
            } else {
                PressurePattern::Fall
            }
        } else {
            PressurePattern::Stable
        }
    }

    /// Dewpoint spread, stability index and spread trend over the most recent
    /// `stability_window` readings.
    pub fn stability(&self, series: &ReadingSeries) -> StabilityResult {
        let recent = series.tail(self.config.stability_window);
        let (Some(first), Some(last)) = (recent.first(), recent.last()) else {
            return StabilityResult::default();
        };

        let first_dewpoint = dewpoint(first.temperature_c, first.humidity);
        let last_dewpoint = dewpoint(last.temperature_c, last.humidity);

        let hours = elapsed_hours(first.timestamp, last.timestamp);
        let spread_rate = if hours > 0.0 {
            (last_dewpoint - first_dewpoint) / hours
        } else {
            0.0
        };

        let temperatures: Vec<f64> = recent.iter().map(|r| r.temperature_c).collect();
        let humidities: Vec<f64> = recent.iter().map(|r| r.humidity).collect();
        let stability_index =
            stats::pearson_correlation(&temperatures, &humidities).unwrap_or(Correlation::Undefined);

        StabilityResult {
            dewpoint_spread: last.temperature_c - last_dewpoint,
            stability_index,
            trend: self.classify_spread_rate(spread_rate),
        }
    }

    fn classify_spread_rate(&self, spread_rate: f64) -> StabilityTrend {
        let threshold = self.config.spread_rate_c_per_hour;
        if exceeds(-spread_rate, threshold) {
            StabilityTrend::Improving
        } else if exceeds(spread_rate, threshold) {
            StabilityTrend::Deteriorating
        } else {
            StabilityTrend::Stable
        }
    }
}
