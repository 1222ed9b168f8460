//! System-wide default constants.
//!
//! Centralises the numbers behind `NowcastConfig::default()`.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Data Source
// ============================================================================

/// Default CSV endpoint of the local weather proxy.
pub const DEFAULT_SOURCE_URL: &str = "http://localhost:8000/weather_data_outdoor.csv";

/// Look-back requested by the primary cycle (hours). 72 = 3 days.
pub const PRIMARY_LOOKBACK_HOURS: u32 = 72;

/// Look-back requested by the statistical trends cycle (hours). 120 = 5 days.
pub const TRENDS_LOOKBACK_HOURS: u32 = 120;

/// Acquisition timeout (seconds).
pub const ACQUISITION_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Trend Analysis
// ============================================================================

/// Most recent valid readings fed to the trend analyzer.
pub const ANALYSIS_WINDOW: usize = 120;

/// Short-term window (readings).
pub const SHORT_TERM_WINDOW: usize = 5;

/// Medium-term window (readings).
pub const MEDIUM_TERM_WINDOW: usize = 15;

/// Long-term window (readings).
pub const LONG_TERM_WINDOW: usize = 60;

/// Window for dewpoint spread and stability index (readings).
pub const STABILITY_WINDOW: usize = 30;

/// Below this many valid readings the cycle publishes a degraded snapshot.
pub const MIN_VALID_READINGS: usize = 5;

/// |rate| above this is a rapid rise/fall (hPa/hour).
pub const RAPID_CHANGE_HPA_PER_HOUR: f64 = 0.06;

/// |rate| above this is a rise/fall (hPa/hour).
pub const CHANGE_HPA_PER_HOUR: f64 = 0.02;

/// |dewpoint rate| above this flips the stability trend (°C/hour).
pub const SPREAD_RATE_C_PER_HOUR: f64 = 1.0;

// ============================================================================
// Alerts
// ============================================================================

/// Short-term |rate| that raises the rapid pressure change alert (hPa/hour).
pub const ALERT_PRESSURE_RATE_HPA_PER_HOUR: f64 = 0.06;

/// Dewpoint spread below which precipitation/fog is flagged (°C).
pub const ALERT_DEWPOINT_SPREAD_C: f64 = 2.5;

// ============================================================================
// Statistical Trends
// ============================================================================

/// Moving average period (samples). 60 samples ≈ 1 hour at 1/min.
pub const MOVING_AVERAGE_PERIOD: usize = 60;

/// Samples used for the pressure correlations.
pub const CORRELATION_WINDOW: usize = 60;

// ============================================================================
// Scheduler
// ============================================================================

/// Primary refresh interval (seconds).
pub const PRIMARY_INTERVAL_SECS: u64 = 60;

/// Statistical trends refresh interval (seconds).
pub const TRENDS_INTERVAL_SECS: u64 = 300;

// ============================================================================
// Simulation
// ============================================================================

/// Spacing between synthetic readings (seconds).
pub const SIMULATION_SAMPLE_PERIOD_SECS: i64 = 60;
