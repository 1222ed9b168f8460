//! Nowcast Configuration - every analysis threshold as an operator-tunable TOML value
//!
//! Each struct implements `Default` with the values in `defaults`, so a missing
//! file or a partial file behaves exactly like the built-in configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "NOWCAST_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "nowcast.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `NowcastConfig::load()` which searches:
/// 1. `$NOWCAST_CONFIG` env var
/// 2. `./nowcast.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowcastConfig {
    /// Data source endpoint and look-back horizons
    #[serde(default)]
    pub source: SourceConfig,

    /// Trend windows and pattern thresholds
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Alert rule thresholds
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Longer-horizon statistics
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Polling cadence
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl NowcastConfig {
    /// Load configuration using the standard search order:
    /// 1. `$NOWCAST_CONFIG` environment variable
    /// 2. `./nowcast.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded nowcast config from NOWCAST_CONFIG");
                        return config.with_env_overrides();
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from NOWCAST_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "NOWCAST_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./nowcast.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded nowcast config from ./nowcast.toml");
                    return config.with_env_overrides();
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./nowcast.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No nowcast.toml found, using built-in defaults");
        Self::default().with_env_overrides()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys only produce warnings; type errors and failed validation
    /// are returned.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        for w in super::validation::validate_plausibility(&config) {
            warn!("{}", w);
        }
        Ok(config)
    }

    /// Apply interval overrides from the environment.
    ///
    /// Precedence: env var > TOML > default.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(secs) = env_secs("NOWCAST_PRIMARY_INTERVAL_SECS") {
            self.scheduler.primary_interval_secs = secs;
        }
        if let Some(secs) = env_secs("NOWCAST_TRENDS_INTERVAL_SECS") {
            self.scheduler.trends_interval_secs = secs;
        }
        self
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate thresholds and windows for internal consistency.
    ///
    /// Rules:
    /// - Rapid thresholds must exceed the plain change threshold
    /// - Windows must be non-zero and short <= medium <= long <= analysis window
    /// - At least two readings are needed for a rate
    /// - Intervals and periods must be non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;
        let mut errors: Vec<String> = Vec::new();

        if a.rapid_change_hpa_per_hour <= a.change_hpa_per_hour {
            errors.push(format!(
                "analysis.rapid_change_hpa_per_hour ({:.3}) must be greater than change_hpa_per_hour ({:.3})",
                a.rapid_change_hpa_per_hour, a.change_hpa_per_hour
            ));
        }
        if a.change_hpa_per_hour < 0.0 {
            errors.push("analysis.change_hpa_per_hour must be >= 0".to_string());
        }
        if a.spread_rate_c_per_hour <= 0.0 {
            errors.push("analysis.spread_rate_c_per_hour must be > 0".to_string());
        }

        for (name, value) in [
            ("analysis.short_term_window", a.short_term_window),
            ("analysis.medium_term_window", a.medium_term_window),
            ("analysis.long_term_window", a.long_term_window),
            ("analysis.stability_window", a.stability_window),
            ("statistics.moving_average_period", self.statistics.moving_average_period),
            ("statistics.correlation_window", self.statistics.correlation_window),
        ] {
            if value == 0 {
                errors.push(format!("{} must be > 0", name));
            }
        }

        if !(a.short_term_window <= a.medium_term_window && a.medium_term_window <= a.long_term_window) {
            errors.push(format!(
                "analysis windows must satisfy short ({}) <= medium ({}) <= long ({})",
                a.short_term_window, a.medium_term_window, a.long_term_window
            ));
        }
        if a.long_term_window > a.window_size || a.stability_window > a.window_size {
            errors.push(format!(
                "analysis.window_size ({}) must cover long_term_window ({}) and stability_window ({})",
                a.window_size, a.long_term_window, a.stability_window
            ));
        }
        if a.min_valid_readings < 2 {
            errors.push("analysis.min_valid_readings must be >= 2".to_string());
        }

        if self.alerts.pressure_rate_hpa_per_hour <= 0.0 {
            errors.push("alerts.pressure_rate_hpa_per_hour must be > 0".to_string());
        }

        let s = &self.scheduler;
        if s.primary_interval_secs == 0 || s.trends_interval_secs == 0 {
            errors.push("scheduler intervals must be > 0".to_string());
        }
        if self.source.timeout_secs == 0 {
            errors.push("source.timeout_secs must be > 0".to_string());
        }
        if self.source.primary_lookback_hours == 0 || self.source.trends_lookback_hours == 0 {
            errors.push("source look-back hours must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

fn env_secs(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&secs| secs > 0)
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// CSV endpoint; `?hours=N` is appended per request
    pub url: String,
    pub primary_lookback_hours: u32,
    pub trends_lookback_hours: u32,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::DEFAULT_SOURCE_URL.to_string(),
            primary_lookback_hours: defaults::PRIMARY_LOOKBACK_HOURS,
            trends_lookback_hours: defaults::TRENDS_LOOKBACK_HOURS,
            timeout_secs: defaults::ACQUISITION_TIMEOUT_SECS,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Most recent valid readings considered at all
    pub window_size: usize,
    pub short_term_window: usize,
    pub medium_term_window: usize,
    pub long_term_window: usize,
    pub stability_window: usize,
    pub min_valid_readings: usize,
    pub rapid_change_hpa_per_hour: f64,
    pub change_hpa_per_hour: f64,
    pub spread_rate_c_per_hour: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: defaults::ANALYSIS_WINDOW,
            short_term_window: defaults::SHORT_TERM_WINDOW,
            medium_term_window: defaults::MEDIUM_TERM_WINDOW,
            long_term_window: defaults::LONG_TERM_WINDOW,
            stability_window: defaults::STABILITY_WINDOW,
            min_valid_readings: defaults::MIN_VALID_READINGS,
            rapid_change_hpa_per_hour: defaults::RAPID_CHANGE_HPA_PER_HOUR,
            change_hpa_per_hour: defaults::CHANGE_HPA_PER_HOUR,
            spread_rate_c_per_hour: defaults::SPREAD_RATE_C_PER_HOUR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub pressure_rate_hpa_per_hour: f64,
    pub dewpoint_spread_c: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            pressure_rate_hpa_per_hour: defaults::ALERT_PRESSURE_RATE_HPA_PER_HOUR,
            dewpoint_spread_c: defaults::ALERT_DEWPOINT_SPREAD_C,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub moving_average_period: usize,
    pub correlation_window: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            moving_average_period: defaults::MOVING_AVERAGE_PERIOD,
            correlation_window: defaults::CORRELATION_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub primary_interval_secs: u64,
    pub trends_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            primary_interval_secs: defaults::PRIMARY_INTERVAL_SECS,
            trends_interval_secs: defaults::TRENDS_INTERVAL_SECS,
        }
    }
}

impl SchedulerConfig {
    pub fn primary_interval(&self) -> Duration {
        Duration::from_secs(self.primary_interval_secs)
    }

    pub fn trends_interval(&self) -> Duration {
        Duration::from_secs(self.trends_interval_secs)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = NowcastConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.short_term_window, 5);
        assert_eq!(config.analysis.medium_term_window, 15);
        assert_eq!(config.analysis.long_term_window, 60);
        assert_eq!(config.scheduler.primary_interval_secs, 60);
        assert_eq!(config.scheduler.trends_interval_secs, 300);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = NowcastConfig::from_toml_str(
            r#"
[analysis]
short_term_window = 3

[scheduler]
primary_interval_secs = 30
"#,
        )
        .expect("partial config should parse");
        assert_eq!(config.analysis.short_term_window, 3);
        assert_eq!(config.analysis.medium_term_window, 15);
        assert_eq!(config.scheduler.primary_interval_secs, 30);
        assert_eq!(config.scheduler.trends_interval_secs, 300);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut config = NowcastConfig::default();
        config.analysis.rapid_change_hpa_per_hour = 0.01;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("rapid_change_hpa_per_hour")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_window_ordering_rejected() {
        let mut config = NowcastConfig::default();
        config.analysis.short_term_window = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = NowcastConfig::default();
        let text = config.to_toml().expect("serialize");
        let parsed = NowcastConfig::from_toml_str(&text).expect("parse");
        assert_eq!(parsed, config);
    }
}
