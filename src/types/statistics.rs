//! Secondary-cycle outputs: longer-horizon statistics over the raw columns
//!
//! Every statistic is optional. `None` means unavailable (too few valid
//! samples) and only affects that one quantity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Correlation;

/// A correlation with the sample count it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationStat {
    pub coefficient: Correlation,
    /// Valid index-aligned pairs used
    pub sample_count: usize,
    /// Two-tailed p-value (Student's t, n-2 dof); `None` below 3 pairs or when undefined
    pub p_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PressureCorrelations {
    pub temperature: Option<CorrelationStat>,
    pub humidity: Option<CorrelationStat>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureStatistics {
    /// Trailing moving average series (hPa)
    pub moving_average: Option<Vec<f64>>,
    /// Population standard deviation (hPa)
    pub std_dev: Option<f64>,
    pub correlation: PressureCorrelations,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureStatistics {
    /// Trailing moving average series (°C)
    pub moving_average: Option<Vec<f64>>,
    /// Population standard deviation (°C)
    pub std_dev: Option<f64>,
}

/// Everything the trends cycle publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticalTrends {
    pub pressure: PressureStatistics,
    pub temperature: TemperatureStatistics,
    /// Raw rows the statistics were computed over
    pub row_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl StatisticalTrends {
    /// Most recent pressure moving-average value.
    pub fn latest_pressure_average(&self) -> Option<f64> {
        self.pressure
            .moving_average
            .as_ref()
            .and_then(|series| series.last().copied())
    }

    /// Most recent temperature moving-average value.
    pub fn latest_temperature_average(&self) -> Option<f64> {
        self.temperature
            .moving_average
            .as_ref()
            .and_then(|series| series.last().copied())
    }
}
