//! CSV Replay Integration Test
//!
//! Writes a station-style CSV export to disk, replays it through
//! `FileCsvSource` and both refresh cycles, and checks the published results.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use weather_nowcast::acquisition::{FileCsvSource, ReadingSource};
use weather_nowcast::config::NowcastConfig;
use weather_nowcast::pipeline::{PrimaryCycle, RefreshScheduler, SnapshotStore, TrendsCycle};
use weather_nowcast::types::{AnalysisSnapshot, PressurePattern, StatisticalTrends};

/// Six hours at one row per minute: pressure falling 0.3 hPa/h, plus a few
/// rows the station wrote with missing sensors.
fn write_export() -> tempfile::NamedTempFile {
    let start = Utc.with_ymd_and_hms(2024, 11, 20, 6, 0, 0).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "timestamp,temperatureC,temperatureF,humidity,pressure").unwrap();

    for minute in 0..360 {
        let ts = (start + ChronoDuration::minutes(minute)).format("%Y-%m-%d %H:%M:%S");
        let pressure = 1008.0 - 0.005 * minute as f64;
        let temperature_c = 9.0 + 0.01 * minute as f64;
        let temperature_f = temperature_c * 9.0 / 5.0 + 32.0;
        if minute % 97 == 50 {
            writeln!(file, "{ts},{temperature_c:.2},{temperature_f:.2},,{pressure:.3}").unwrap();
        } else {
            writeln!(
                file,
                "{ts},{temperature_c:.2},{temperature_f:.2},75.0,{pressure:.3}"
            )
            .unwrap();
        }
    }
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn replayed_export_produces_falling_trend() {
    let file = write_export();
    let config = NowcastConfig::default();
    let source: Arc<dyn ReadingSource> = Arc::new(FileCsvSource::new(file.path()));

    let rows = source.fetch(config.source.primary_lookback_hours).await.unwrap();
    assert_eq!(rows.len(), 360);
    assert_eq!(rows.iter().filter(|r| r.humidity.is_none()).count(), 4);

    let store: Arc<SnapshotStore<AnalysisSnapshot>> = Arc::new(SnapshotStore::new());
    let mut scheduler = RefreshScheduler::new(
        PrimaryCycle::from_config(&config),
        Arc::clone(&source),
        Arc::clone(&store),
        Duration::from_secs(60),
        CancellationToken::new(),
    );
    assert!(scheduler.run_cycle().await.is_published());

    let snapshot = store.load().unwrap();
    assert_eq!(snapshot.reading_count, 120);
    for trend in [
        snapshot.pressure_trends.short_term,
        snapshot.pressure_trends.medium_term,
        snapshot.pressure_trends.long_term,
    ] {
        assert!((trend.rate - (-0.3)).abs() < 0.01, "rate {}", trend.rate);
        assert_eq!(trend.pattern, PressurePattern::RapidFall);
    }
}

#[tokio::test]
async fn replayed_export_feeds_statistics() {
    let file = write_export();
    let config = NowcastConfig::default();
    let store: Arc<SnapshotStore<StatisticalTrends>> = Arc::new(SnapshotStore::new());
    let mut scheduler = RefreshScheduler::new(
        TrendsCycle::from_config(&config),
        Arc::new(FileCsvSource::new(file.path())),
        Arc::clone(&store),
        Duration::from_secs(300),
        CancellationToken::new(),
    );
    assert!(scheduler.run_cycle().await.is_published());

    let trends = store.load().unwrap();
    assert_eq!(trends.row_count, 360);
    assert_eq!(trends.pressure.moving_average.as_ref().unwrap().len(), 301);

    // Pressure falls while temperature rises
    let temp = trends.pressure.correlation.temperature.unwrap();
    assert_eq!(temp.sample_count, 60);
    assert!(temp.coefficient.value() < -0.99);

    // Humidity is constant where present
    let humidity = trends.pressure.correlation.humidity.unwrap();
    assert!(humidity.coefficient.is_undefined());

    let json = serde_json::to_value(&*trends).unwrap();
    assert_eq!(json["rowCount"], 360);
    assert_eq!(json["pressure"]["movingAverage"].as_array().unwrap().len(), 301);
    assert_eq!(json["pressure"]["correlation"]["temperature"]["sampleCount"], 60);
    assert!(json["pressure"]["correlation"]["humidity"]["coefficient"].is_null());
    assert!(json["temperature"]["stdDev"].is_number());
}

#[tokio::test]
async fn lookback_trims_old_rows() {
    let file = write_export();
    let source = FileCsvSource::new(file.path());
    let rows = source.fetch(1).await.unwrap();
    assert_eq!(rows.len(), 61);
}
