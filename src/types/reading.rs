//! Sensor reading types: RawReading (acquisition boundary), Reading, ReadingSeries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Acquisition boundary
// ============================================================================

/// One deserialized row from the data source.
///
/// Every field is optional: empty cells and unparseable values arrive as `None`
/// and are resolved by validation, not by the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub timestamp: Option<DateTime<Utc>>,
    /// Barometric pressure (hPa)
    pub pressure: Option<f64>,
    /// Air temperature (°C)
    pub temperature_c: Option<f64>,
    /// Relative humidity (%)
    pub humidity: Option<f64>,
}

impl RawReading {
    /// Build a fully-populated row.
    pub fn new(timestamp: DateTime<Utc>, pressure: f64, temperature_c: f64, humidity: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            pressure: Some(pressure),
            temperature_c: Some(temperature_c),
            humidity: Some(humidity),
        }
    }
}

/// Why a row was rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReading {
    MissingField(&'static str),
    NonFinite(&'static str),
    HumidityOutOfRange,
    NonPositivePressure,
}

impl std::fmt::Display for InvalidReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field '{}'", field),
            Self::NonFinite(field) => write!(f, "non-finite value in '{}'", field),
            Self::HumidityOutOfRange => write!(f, "humidity outside (0, 100]"),
            Self::NonPositivePressure => write!(f, "pressure must be positive"),
        }
    }
}

impl std::error::Error for InvalidReading {}

// ============================================================================
// Validated reading
// ============================================================================

/// One valid sensor sample. All fields present and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    /// Barometric pressure (hPa)
    pub pressure: f64,
    /// Air temperature (°C)
    pub temperature_c: f64,
    /// Relative humidity (%), within (0, 100]
    pub humidity: f64,
}

impl TryFrom<&RawReading> for Reading {
    type Error = InvalidReading;

    fn try_from(raw: &RawReading) -> Result<Self, Self::Error> {
        let timestamp = raw.timestamp.ok_or(InvalidReading::MissingField("timestamp"))?;
        let pressure = finite(raw.pressure, "pressure")?;
        let temperature_c = finite(raw.temperature_c, "temperatureC")?;
        let humidity = finite(raw.humidity, "humidity")?;

        // ln(0) in the dewpoint model is -inf, so zero humidity is treated as implausible
        if humidity <= 0.0 || humidity > 100.0 {
            return Err(InvalidReading::HumidityOutOfRange);
        }
        if pressure <= 0.0 {
            return Err(InvalidReading::NonPositivePressure);
        }

        Ok(Self {
            timestamp,
            pressure,
            temperature_c,
            humidity,
        })
    }
}

fn finite(value: Option<f64>, field: &'static str) -> Result<f64, InvalidReading> {
    match value {
        None => Err(InvalidReading::MissingField(field)),
        Some(v) if !v.is_finite() => Err(InvalidReading::NonFinite(field)),
        Some(v) => Ok(v),
    }
}

// ============================================================================
// Series
// ============================================================================

/// Ordered sequence of valid readings, oldest first.
///
/// Rebuilt from scratch every refresh cycle. Arrival order is taken as time
/// order; `is_time_ordered` lets callers check that assumption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingSeries {
    readings: Vec<Reading>,
    dropped: usize,
}

impl ReadingSeries {
    /// Validate raw rows, silently dropping any row that fails.
    pub fn from_raw(rows: &[RawReading]) -> Self {
        let mut readings = Vec::with_capacity(rows.len());
        let mut dropped = 0;

        for (index, row) in rows.iter().enumerate() {
            match Reading::try_from(row) {
                Ok(reading) => readings.push(reading),
                Err(e) => {
                    dropped += 1;
                    tracing::debug!(row = index, reason = %e, "Dropping invalid reading");
                }
            }
        }

        Self { readings, dropped }
    }

    /// Wrap readings that are already known to be valid.
    pub fn from_readings(readings: Vec<Reading>) -> Self {
        Self { readings, dropped: 0 }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Number of raw rows rejected while building this series.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The most recent `n` readings (all of them if fewer exist).
    pub fn tail(&self, n: usize) -> &[Reading] {
        let start = self.readings.len().saturating_sub(n);
        &self.readings[start..]
    }

    /// A new series holding only the most recent `n` readings.
    pub fn recent(&self, n: usize) -> Self {
        Self {
            readings: self.tail(n).to_vec(),
            dropped: self.dropped,
        }
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// True when timestamps never decrease.
    pub fn is_time_ordered(&self) -> bool {
        self.readings
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }
}

/// Elapsed time between two instants in fractional hours.
pub fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_row_converts() {
        let raw = RawReading::new(t0(), 1013.2, 18.5, 60.0);
        let reading = Reading::try_from(&raw).expect("valid row");
        assert_eq!(reading.pressure, 1013.2);
        assert_eq!(reading.temperature_c, 18.5);
    }

    #[test]
    fn test_missing_and_non_finite_fields_rejected() {
        let mut raw = RawReading::new(t0(), 1013.2, 18.5, 60.0);
        raw.pressure = None;
        assert_eq!(
            Reading::try_from(&raw),
            Err(InvalidReading::MissingField("pressure"))
        );

        let raw = RawReading::new(t0(), 1013.2, f64::NAN, 60.0);
        assert_eq!(
            Reading::try_from(&raw),
            Err(InvalidReading::NonFinite("temperatureC"))
        );
    }

    #[test]
    fn test_zero_temperature_is_valid_but_zero_humidity_is_not() {
        let raw = RawReading::new(t0(), 1013.2, 0.0, 60.0);
        assert!(Reading::try_from(&raw).is_ok());

        let raw = RawReading::new(t0(), 1013.2, 10.0, 0.0);
        assert_eq!(
            Reading::try_from(&raw),
            Err(InvalidReading::HumidityOutOfRange)
        );
    }

    #[test]
    fn test_series_drops_invalid_rows_and_keeps_order() {
        let rows = vec![
            RawReading::new(t0(), 1013.0, 20.0, 50.0),
            RawReading {
                humidity: None,
                ..RawReading::new(t0() + Duration::minutes(1), 1013.1, 20.0, 50.0)
            },
            RawReading::new(t0() + Duration::minutes(2), 1013.2, 20.0, 50.0),
        ];

        let series = ReadingSeries::from_raw(&rows);
        assert_eq!(series.len(), 2);
        assert_eq!(series.dropped(), 1);
        assert_eq!(series.readings()[1].pressure, 1013.2);
        assert!(series.is_time_ordered());
    }

    #[test]
    fn test_tail_clamps_to_available() {
        let rows: Vec<_> = (0..3)
            .map(|i| RawReading::new(t0() + Duration::minutes(i), 1013.0, 20.0, 50.0))
            .collect();
        let series = ReadingSeries::from_raw(&rows);
        assert_eq!(series.tail(5).len(), 3);
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.recent(1).len(), 1);
    }

    #[test]
    fn test_elapsed_hours() {
        assert!((elapsed_hours(t0(), t0() + Duration::minutes(90)) - 1.5).abs() < 1e-12);
    }
}
