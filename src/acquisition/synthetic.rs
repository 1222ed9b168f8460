//! Synthetic weather generator for demo runs (`nowcast --simulate`)
//!
//! Produces one reading per sample period ending at "now":
//! - temperature follows a diurnal sine peaking mid-afternoon
//! - humidity moves opposite to temperature
//! - pressure drifts slowly as a random walk with a weak pull toward 1013 hPa

use std::f64::consts::PI;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};
use rand::prelude::*;
use rand_distr::StandardNormal;

use super::{AcquisitionError, ReadingSource};
use crate::config::defaults::SIMULATION_SAMPLE_PERIOD_SECS;
use crate::types::RawReading;

const MEAN_PRESSURE_HPA: f64 = 1013.0;
const MEAN_TEMPERATURE_C: f64 = 14.0;
const TEMPERATURE_AMPLITUDE_C: f64 = 6.0;
const MEAN_HUMIDITY_PCT: f64 = 70.0;
const HUMIDITY_AMPLITUDE_PCT: f64 = 18.0;
const PEAK_HOUR: f64 = 15.0;

/// Per-sample pressure step std dev (hPa)
const PRESSURE_STEP_SD: f64 = 0.02;
/// Sensor noise std dev (°C; scaled ×4 for humidity %)
const SENSOR_NOISE_SD: f64 = 0.15;

pub struct SyntheticSource {
    rng: Mutex<StdRng>,
    sample_period_secs: i64,
}

impl SyntheticSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            rng: Mutex::new(rng),
            sample_period_secs: SIMULATION_SAMPLE_PERIOD_SECS,
        }
    }

    pub fn with_sample_period(mut self, secs: i64) -> Self {
        self.sample_period_secs = secs.max(1);
        self
    }

    /// Generate readings covering `lookback_hours` up to `end`.
    pub fn generate(&self, lookback_hours: u32, end: DateTime<Utc>) -> Vec<RawReading> {
        let count = i64::from(lookback_hours) * 3600 / self.sample_period_secs;
        let start = end - Duration::seconds(count * self.sample_period_secs);

        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut pressure = MEAN_PRESSURE_HPA + rng.gen_range(-8.0..8.0);
        let mut rows = Vec::with_capacity(usize::try_from(count).unwrap_or(0) + 1);

        for i in 0..=count {
            let timestamp = start + Duration::seconds(i * self.sample_period_secs);
            let hour = f64::from(timestamp.hour()) + f64::from(timestamp.minute()) / 60.0;
            let diurnal = (2.0 * PI * (hour - PEAK_HOUR + 6.0) / 24.0).sin();

            let step: f64 = rng.sample(StandardNormal);
            let temperature_noise: f64 = rng.sample(StandardNormal);
            let humidity_noise: f64 = rng.sample(StandardNormal);

            pressure += step * PRESSURE_STEP_SD + (MEAN_PRESSURE_HPA - pressure) * 0.0005;
            let temperature = MEAN_TEMPERATURE_C
                + TEMPERATURE_AMPLITUDE_C * diurnal
                + temperature_noise * SENSOR_NOISE_SD;
            let humidity = (MEAN_HUMIDITY_PCT - HUMIDITY_AMPLITUDE_PCT * diurnal
                + humidity_noise * SENSOR_NOISE_SD * 4.0)
                .clamp(5.0, 100.0);

            rows.push(RawReading::new(timestamp, pressure, temperature, humidity));
        }

        rows
    }
}

#[async_trait]
impl ReadingSource for SyntheticSource {
    async fn fetch(&self, lookback_hours: u32) -> Result<Vec<RawReading>, AcquisitionError> {
        Ok(self.generate(lookback_hours, Utc::now()))
    }

    fn source_name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReadingSeries;
    use chrono::TimeZone;

    #[test]
    fn test_generates_valid_ordered_series() {
        let source = SyntheticSource::new(Some(42));
        let end = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let rows = source.generate(2, end);

        assert_eq!(rows.len(), 121);
        assert_eq!(rows.last().unwrap().timestamp, Some(end));

        let series = ReadingSeries::from_raw(&rows);
        assert_eq!(series.dropped(), 0);
        assert!(series.is_time_ordered());
    }

    #[test]
    fn test_seeded_sources_are_reproducible() {
        let end = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let a = SyntheticSource::new(Some(7)).generate(1, end);
        let b = SyntheticSource::new(Some(7)).generate(1, end);
        assert_eq!(a, b);
    }

    #[test]
    fn test_afternoon_warmer_than_dawn() {
        let source = SyntheticSource::new(Some(1)).with_sample_period(3600);
        let end = Utc.with_ymd_and_hms(2024, 7, 2, 0, 0, 0).unwrap();
        let rows = source.generate(24, end);
        let at = |h: u32| {
            rows.iter()
                .find(|r| r.timestamp.map(|t| t.hour()) == Some(h))
                .and_then(|r| r.temperature_c)
                .unwrap()
        };
        assert!(at(15) > at(3));
    }
}
