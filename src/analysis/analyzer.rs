//! Primary-cycle analysis: rows in, snapshot out.

use thiserror::Error;

use crate::config::{AlertConfig, AnalysisConfig};
use crate::types::{AnalysisSnapshot, RawReading, ReadingSeries};

use super::alerts::AlertEngine;
use super::trend::TrendAnalyzer;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Insufficient data: {valid_readings} valid readings, {required} required")]
    InsufficientData { valid_readings: usize, required: usize },
}

/// Combines trend, stability and alert evaluation into one snapshot.
#[derive(Debug, Clone, Default)]
pub struct NowcastAnalyzer {
    trends: TrendAnalyzer,
    alerts: AlertEngine,
}

impl NowcastAnalyzer {
    pub fn new(analysis: AnalysisConfig, alerts: AlertConfig) -> Self {
        Self {
            trends: TrendAnalyzer::new(analysis),
            alerts: AlertEngine::new(alerts),
        }
    }

    fn config(&self) -> &AnalysisConfig {
        self.trends.config()
    }

    /// Analyze raw rows. Never fails: too few valid rows yields the degraded
    /// insufficient-data snapshot.
    pub fn analyze(&self, rows: &[RawReading]) -> AnalysisSnapshot {
        let series = ReadingSeries::from_raw(rows);
        if series.dropped() > 0 {
            tracing::debug!(
                dropped = series.dropped(),
                valid = series.len(),
                "Invalid rows dropped before analysis"
            );
        }

        match self.try_analyze_series(&series) {
            Ok(snapshot) => snapshot,
            Err(AnalysisError::InsufficientData { valid_readings, required }) => {
                tracing::info!(
                    valid_readings,
                    required,
                    "Insufficient data, publishing degraded snapshot"
                );
                AnalysisSnapshot::insufficient_data(valid_readings, AlertEngine::insufficient_data())
            }
        }
    }

    /// Analyze an already-validated series over its most recent
    /// `window_size` readings.
    pub fn try_analyze_series(&self, series: &ReadingSeries) -> Result<AnalysisSnapshot, AnalysisError> {
        let required = self.config().min_valid_readings;
        if series.len() < required {
            return Err(AnalysisError::InsufficientData {
                valid_readings: series.len(),
                required,
            });
        }

        let window = series.recent(self.config().window_size);
        if !window.is_time_ordered() {
            tracing::warn!("Readings are not in ascending time order; rates may be distorted");
        }

        let pressure_trends = self.trends.pressure_trends(&window);
        let stability = self.trends.stability(&window);
        let alerts = self.alerts.evaluate(&pressure_trends, &stability);

        Ok(AnalysisSnapshot {
            pressure_trends,
            temperature_humidity: stability,
            alerts,
            reading_count: window.len(),
            generated_at: chrono::Utc::now(),
        })
    }
}
