//! Longer-horizon statistics over the raw reading columns
//!
//! Works on raw rows rather than validated readings: each column keeps its
//! own gaps, so a dead humidity sensor only blanks the humidity correlation
//! and leaves pressure and temperature statistics intact.

use chrono::Utc;

use crate::config::StatisticsConfig;
use crate::types::{
    CorrelationStat, PressureCorrelations, PressureStatistics, RawReading, StatisticalTrends,
    TemperatureStatistics,
};

use super::stats;

/// Index-aligned columns extracted from raw rows.
#[derive(Debug, Clone, Default)]
pub struct ReadingColumns {
    pub pressure: Vec<Option<f64>>,
    pub temperature_c: Vec<Option<f64>>,
    pub humidity: Vec<Option<f64>>,
}

impl ReadingColumns {
    pub fn from_rows(rows: &[RawReading]) -> Self {
        Self {
            pressure: rows.iter().map(|r| r.pressure).collect(),
            temperature_c: rows.iter().map(|r| r.temperature_c).collect(),
            humidity: rows.iter().map(|r| r.humidity).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticalTrendsAnalyzer {
    config: StatisticsConfig,
}

impl StatisticalTrendsAnalyzer {
    pub fn new(config: StatisticsConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, rows: &[RawReading]) -> StatisticalTrends {
        let columns = ReadingColumns::from_rows(rows);
        let period = self.config.moving_average_period;

        let trends = StatisticalTrends {
            pressure: PressureStatistics {
                moving_average: stats::moving_average(&columns.pressure, period),
                std_dev: stats::standard_deviation(&columns.pressure),
                correlation: PressureCorrelations {
                    temperature: self.recent_correlation(&columns.pressure, &columns.temperature_c),
                    humidity: self.recent_correlation(&columns.pressure, &columns.humidity),
                },
            },
            temperature: TemperatureStatistics {
                moving_average: stats::moving_average(&columns.temperature_c, period),
                std_dev: stats::standard_deviation(&columns.temperature_c),
            },
            row_count: columns.len(),
            generated_at: Utc::now(),
        };

        tracing::debug!(
            rows = columns.len(),
            pressure_std_dev = ?trends.pressure.std_dev,
            temperature_std_dev = ?trends.temperature.std_dev,
            "Statistical trends computed"
        );

        trends
    }

    /// Correlation over the most recent `correlation_window` valid pairs.
    fn recent_correlation(&self, xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<CorrelationStat> {
        let pairs = stats::valid_pairs(xs, ys);
        let start = pairs.len().saturating_sub(self.config.correlation_window);
        let recent = &pairs[start..];

        let coefficient = stats::pearson_from_pairs(recent)?;
        Some(CorrelationStat {
            coefficient,
            sample_count: recent.len(),
            p_value: coefficient
                .coefficient()
                .and_then(|r| stats::correlation_p_value(r, recent.len())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    }

    fn rows(n: usize) -> Vec<RawReading> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                RawReading::new(
                    t0() + Duration::minutes(i as i64),
                    1010.0 + 0.01 * x,
                    10.0 + 0.05 * x,
                    90.0 - 0.1 * x,
                )
            })
            .collect()
    }

    #[test]
    fn test_full_statistics() {
        let analyzer = StatisticalTrendsAnalyzer::default();
        let trends = analyzer.analyze(&rows(120));

        let ma = trends.pressure.moving_average.as_ref().unwrap();
        assert_eq!(ma.len(), 61);
        assert_eq!(trends.temperature.moving_average.as_ref().unwrap().len(), 61);
        assert!(trends.pressure.std_dev.unwrap() > 0.0);

        let temp = trends.pressure.correlation.temperature.unwrap();
        assert_eq!(temp.sample_count, 60);
        assert!((temp.coefficient.value() - 1.0).abs() < 1e-9);
        assert_eq!(temp.p_value, Some(0.0));

        let humidity = trends.pressure.correlation.humidity.unwrap();
        assert!((humidity.coefficient.value() + 1.0).abs() < 1e-9);
        assert_eq!(trends.row_count, 120);
    }

    #[test]
    fn test_short_series_only_blanks_moving_average() {
        let analyzer = StatisticalTrendsAnalyzer::default();
        let trends = analyzer.analyze(&rows(30));
        assert_eq!(trends.pressure.moving_average, None);
        assert_eq!(trends.temperature.moving_average, None);
        assert!(trends.pressure.std_dev.is_some());
        let corr = trends.pressure.correlation.temperature.unwrap();
        assert_eq!(corr.sample_count, 30);
    }

    #[test]
    fn test_missing_column_only_blanks_its_quantities() {
        let analyzer = StatisticalTrendsAnalyzer::default();
        let mut data = rows(90);
        for row in &mut data {
            row.humidity = None;
        }
        let trends = analyzer.analyze(&data);
        assert_eq!(trends.pressure.correlation.humidity, None);
        assert!(trends.pressure.correlation.temperature.is_some());
        assert!(trends.pressure.moving_average.is_some());
        assert!(trends.temperature.std_dev.is_some());
    }

    #[test]
    fn test_constant_temperature_correlation_is_undefined() {
        let analyzer = StatisticalTrendsAnalyzer::default();
        let mut data = rows(60);
        for row in &mut data {
            row.temperature_c = Some(12.0);
        }
        let corr = analyzer.analyze(&data).pressure.correlation.temperature.unwrap();
        assert!(corr.coefficient.is_undefined());
        assert_eq!(corr.p_value, None);
        assert_eq!(analyzer.analyze(&data).temperature.std_dev, Some(0.0));
    }

    #[test]
    fn test_empty_input() {
        let trends = StatisticalTrendsAnalyzer::default().analyze(&[]);
        assert_eq!(trends.pressure.std_dev, None);
        assert_eq!(trends.pressure.moving_average, None);
        assert_eq!(trends.pressure.correlation.temperature, None);
        assert_eq!(trends.latest_temperature_average(), None);
    }

    #[test]
    fn test_moving_average_skips_gaps() {
        let analyzer = StatisticalTrendsAnalyzer::new(StatisticsConfig {
            moving_average_period: 3,
            correlation_window: 60,
        });
        let mut data = rows(5);
        data[1].pressure = None;
        let trends = analyzer.analyze(&data);
        // 4 valid pressures, period 3
        assert_eq!(trends.pressure.moving_average.as_ref().unwrap().len(), 2);
    }
}
