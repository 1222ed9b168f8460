//! Concrete reading sources: HTTP, file replay and in-memory.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::{csv_parser::parse_csv, within_lookback, AcquisitionError, ReadingSource};
use crate::types::RawReading;

// ============================================================================
// HTTP CSV Source
// ============================================================================

/// Fetches a CSV export over HTTP: `GET {url}?hours={lookback_hours}`.
#[derive(Clone)]
pub struct HttpCsvSource {
    http: reqwest::Client,
    url: String,
}

impl HttpCsvSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, AcquisitionError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request URL for a given look-back.
    pub fn request_url(&self, lookback_hours: u32) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}hours={}", self.url, separator, lookback_hours)
    }
}

#[async_trait]
impl ReadingSource for HttpCsvSource {
    async fn fetch(&self, lookback_hours: u32) -> Result<Vec<RawReading>, AcquisitionError> {
        let url = self.request_url(lookback_hours);
        let resp = self.http.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status(status));
        }

        let text = resp.text().await?;
        parse_csv(&text)
    }

    fn source_name(&self) -> &str {
        "HTTP-CSV"
    }
}

// ============================================================================
// File CSV Source (replay)
// ============================================================================

/// Re-reads a CSV export from disk on every fetch.
///
/// The look-back is applied relative to the newest row in the file, so an old
/// export replays as if it had just been recorded.
#[derive(Debug, Clone)]
pub struct FileCsvSource {
    path: PathBuf,
}

impl FileCsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReadingSource for FileCsvSource {
    async fn fetch(&self, lookback_hours: u32) -> Result<Vec<RawReading>, AcquisitionError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(within_lookback(parse_csv(&text)?, lookback_hours))
    }

    fn source_name(&self) -> &str {
        "CSV-file"
    }
}

// ============================================================================
// Static Source (in-memory)
// ============================================================================

/// Serves a fixed set of rows, optionally after a delay.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    rows: Vec<RawReading>,
    delay: Option<Duration>,
}

impl StaticSource {
    pub fn new(rows: Vec<RawReading>) -> Self {
        Self { rows, delay: None }
    }

    /// Sleep this long before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ReadingSource for StaticSource {
    async fn fetch(&self, lookback_hours: u32) -> Result<Vec<RawReading>, AcquisitionError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(within_lookback(self.rows.clone(), lookback_hours))
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_request_url() {
        let source = HttpCsvSource::new(
            "http://station.local/weather_data_outdoor.csv/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            source.request_url(72),
            "http://station.local/weather_data_outdoor.csv?hours=72"
        );

        let source =
            HttpCsvSource::new("http://station.local/data?site=roof", Duration::from_secs(5)).unwrap();
        assert_eq!(source.request_url(120), "http://station.local/data?site=roof&hours=120");
    }

    #[tokio::test]
    async fn test_file_source_reads_and_filters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,pressure,temperatureC,humidity").unwrap();
        for hour in 0..6 {
            writeln!(file, "2024-01-01 {hour:02}:00:00,1013.{hour},5.0,80").unwrap();
        }
        file.flush().unwrap();

        let source = FileCsvSource::new(file.path());
        let rows = source.fetch(2).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].pressure, Some(1013.3));
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileCsvSource::new("/nonexistent/weather.csv");
        assert!(matches!(source.fetch(72).await, Err(AcquisitionError::Io(_))));
    }

    #[tokio::test]
    async fn test_static_source_returns_rows() {
        let rows = vec![RawReading::default(); 3];
        let source = StaticSource::new(rows);
        assert_eq!(source.fetch(72).await.unwrap().len(), 3);
        assert_eq!(source.source_name(), "static");
    }
}
