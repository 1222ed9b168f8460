//! Delimited-text parsing for weather station exports
//!
//! Expected header (column order free, extra columns ignored):
//! timestamp,temperatureC,temperatureF,humidity,pressure,...
//!
//! Only the header is mandatory. A cell that is empty or fails to parse becomes
//! `None` on that row; the row itself is kept and rejected later by validation.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use super::AcquisitionError;
use crate::types::RawReading;

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const PRESSURE_COLUMN: &str = "pressure";
pub const TEMPERATURE_COLUMN: &str = "temperatureC";
pub const HUMIDITY_COLUMN: &str = "humidity";

/// Station exports carry no zone; these timestamps are read as UTC.
const STATION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    timestamp: usize,
    pressure: usize,
    temperature_c: usize,
    humidity: usize,
}

impl ColumnIndex {
    fn from_header(header: &str) -> Result<Self, AcquisitionError> {
        let names: Vec<&str> = header
            .split(',')
            .map(|name| name.trim().trim_matches('"'))
            .collect();
        let find = |wanted: &str| {
            names
                .iter()
                .position(|name| *name == wanted)
                .ok_or_else(|| AcquisitionError::Malformed(format!("missing '{wanted}' column")))
        };

        Ok(Self {
            timestamp: find(TIMESTAMP_COLUMN)?,
            pressure: find(PRESSURE_COLUMN)?,
            temperature_c: find(TEMPERATURE_COLUMN)?,
            humidity: find(HUMIDITY_COLUMN)?,
        })
    }
}

/// Parse CSV text into raw rows, oldest first as written.
///
/// Fails only when the text has no header or the header lacks one of the
/// required columns. Blank lines are skipped.
pub fn parse_csv(text: &str) -> Result<Vec<RawReading>, AcquisitionError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| AcquisitionError::Malformed("empty response".to_string()))?;
    let columns = ColumnIndex::from_header(header)?;

    let mut rows = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split(',').collect();
        let cell = |i: usize| fields.get(i).map(|s| s.trim().trim_matches('"'));

        rows.push(RawReading {
            timestamp: cell(columns.timestamp).and_then(parse_timestamp),
            pressure: cell(columns.pressure).and_then(parse_number),
            temperature_c: cell(columns.temperature_c).and_then(parse_number),
            humidity: cell(columns.humidity).and_then(parse_number),
        });
    }

    tracing::debug!(rows = rows.len(), "Parsed CSV rows");
    Ok(rows)
}

fn parse_number(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Parse a timestamp cell.
///
/// Accepts RFC 3339, the station's `YYYY-MM-DD HH:MM:SS` (read as UTC), and
/// Unix epoch seconds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, STATION_TIMESTAMP_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(epoch) = s.parse::<i64>() {
        return Utc.timestamp_opt(epoch, 0).single();
    }

    format!("{}Z", s.trim_end_matches('Z')).parse::<DateTime<Utc>>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
timestamp,temperatureC,temperatureF,humidity,pressure,windSpeed
2024-05-01 10:00:00,18.5,65.3,62.0,1012.4,3.1
2024-05-01 10:01:00,18.6,65.5,61.8,1012.3,2.9

2024-05-01 10:02:00,,,61.5,1012.3,2.7
";

    #[test]
    fn test_parse_station_export() {
        let rows = parse_csv(SAMPLE).unwrap();
        assert_eq!(rows.len(), 3);

        let first = rows[0];
        assert_eq!(first.pressure, Some(1012.4));
        assert_eq!(first.temperature_c, Some(18.5));
        assert_eq!(first.humidity, Some(62.0));
        assert_eq!(
            first.timestamp,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );

        // Empty cells become None but keep the row
        assert_eq!(rows[2].temperature_c, None);
        assert_eq!(rows[2].pressure, Some(1012.3));
    }

    #[test]
    fn test_column_order_is_free() {
        let text = "pressure,humidity,timestamp,temperatureC\n1009.0,80,1714557600,12.0\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows[0].pressure, Some(1009.0));
        assert_eq!(rows[0].humidity, Some(80.0));
        assert_eq!(rows[0].temperature_c, Some(12.0));
        assert_eq!(rows[0].timestamp, Utc.timestamp_opt(1_714_557_600, 0).single());
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse_csv("timestamp,temperatureC,humidity\n").unwrap_err();
        assert!(matches!(err, AcquisitionError::Malformed(msg) if msg.contains("pressure")));
    }

    #[test]
    fn test_empty_body_is_malformed() {
        assert!(matches!(parse_csv("  \n\n"), Err(AcquisitionError::Malformed(_))));
    }

    #[test]
    fn test_unparseable_cells_and_short_rows() {
        let text = "timestamp,pressure,temperatureC,humidity\nnot-a-date,abc,20.0\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, None);
        assert_eq!(rows[0].pressure, None);
        assert_eq!(rows[0].temperature_c, Some(20.0));
        assert_eq!(rows[0].humidity, None);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 10:00:00"), Some(expected));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
