//! Reading acquisition
//!
//! Everything that turns an external feed into `RawReading` rows:
//!
//! - [`ReadingSource`]: async trait the schedulers fetch through
//! - [`csv_parser`]: header-indexed delimited-text parsing
//! - [`HttpCsvSource`]: CSV over HTTP (`{url}?hours={h}`)
//! - [`FileCsvSource`] / [`StaticSource`]: replay from disk or memory
//! - [`SyntheticSource`]: generated diurnal data for demo runs

pub mod csv_parser;
pub mod source;
pub mod synthetic;

pub use csv_parser::parse_csv;
pub use source::{FileCsvSource, HttpCsvSource, StaticSource};
pub use synthetic::SyntheticSource;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;

use crate::types::RawReading;

/// Acquisition failures. Any of these aborts the current cycle and leaves the
/// previously published result in place.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Data source returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Data source did not respond within {0:?}")]
    Timeout(Duration),
    #[error("Malformed data: {0}")]
    Malformed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where readings come from.
///
/// One call per refresh cycle; implementations must not retry internally.
#[async_trait]
pub trait ReadingSource: Send + Sync + 'static {
    /// Rows covering the last `lookback_hours`, oldest first.
    async fn fetch(&self, lookback_hours: u32) -> Result<Vec<RawReading>, AcquisitionError>;

    /// Human-readable name for logging (e.g. "HTTP-CSV", "synthetic").
    fn source_name(&self) -> &str;
}

/// Keep rows no older than `lookback_hours` before the newest timestamp.
///
/// Rows without a timestamp are kept; validation drops them later.
pub fn within_lookback(rows: Vec<RawReading>, lookback_hours: u32) -> Vec<RawReading> {
    let Some(newest) = rows.iter().filter_map(|r| r.timestamp).max() else {
        return rows;
    };
    let cutoff = newest - ChronoDuration::hours(i64::from(lookback_hours));
    rows.into_iter()
        .filter(|r| r.timestamp.map_or(true, |ts| ts >= cutoff))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_within_lookback_is_relative_to_newest_row() {
        let t0 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let rows: Vec<RawReading> = (0..10)
            .map(|h| RawReading::new(t0 + ChronoDuration::hours(h), 1013.0, 10.0, 70.0))
            .collect();

        let kept = within_lookback(rows.clone(), 3);
        assert_eq!(kept.len(), 4);
        assert_eq!(kept[0].timestamp, Some(t0 + ChronoDuration::hours(6)));

        assert_eq!(within_lookback(rows, 100).len(), 10);
        assert!(within_lookback(Vec::new(), 3).is_empty());
    }
}
