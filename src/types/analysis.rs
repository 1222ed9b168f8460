//! Primary-cycle analysis outputs: TrendResult, StabilityResult, Alert, AnalysisSnapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Pressure trends
// ============================================================================

/// Qualitative classification of a pressure rate of change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PressurePattern {
    #[default]
    Stable,
    Rise,
    Fall,
    RapidRise,
    RapidFall,
}

impl PressurePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Rise => "rise",
            Self::Fall => "fall",
            Self::RapidRise => "rapid-rise",
            Self::RapidFall => "rapid-fall",
        }
    }

    pub fn is_rapid(&self) -> bool {
        matches!(self, Self::RapidRise | Self::RapidFall)
    }
}

impl std::fmt::Display for PressurePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rate of change for one window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendResult {
    /// hPa per hour
    pub rate: f64,
    pub pattern: PressurePattern,
}

impl TrendResult {
    /// Zero rate, stable pattern.
    pub fn stable() -> Self {
        Self::default()
    }
}

/// Pressure trends at the three window horizons.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureTrends {
    pub short_term: TrendResult,
    pub medium_term: TrendResult,
    pub long_term: TrendResult,
}

// ============================================================================
// Temperature / humidity stability
// ============================================================================

/// Pearson correlation coefficient.
///
/// `Undefined` replaces the NaN a zero-variance input would produce.
/// Serializes as a number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Correlation {
    Coefficient(f64),
    Undefined,
}

impl Correlation {
    /// Raw value; NaN when undefined.
    pub fn value(&self) -> f64 {
        match self {
            Self::Coefficient(r) => *r,
            Self::Undefined => f64::NAN,
        }
    }

    pub fn coefficient(&self) -> Option<f64> {
        match self {
            Self::Coefficient(r) => Some(*r),
            Self::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl From<Option<f64>> for Correlation {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(r) if r.is_finite() => Self::Coefficient(r),
            _ => Self::Undefined,
        }
    }
}

impl From<Correlation> for Option<f64> {
    fn from(value: Correlation) -> Self {
        value.coefficient()
    }
}

impl std::fmt::Display for Correlation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coefficient(r) => write!(f, "{:.3}", r),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

/// Direction of the dewpoint-spread trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityTrend {
    Improving,
    #[default]
    Stable,
    Deteriorating,
}

impl std::fmt::Display for StabilityTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Deteriorating => "deteriorating",
        };
        write!(f, "{}", s)
    }
}

/// Banding of the stability index.
///
/// Negative temperature/humidity correlation reads as stable air, positive as
/// unstable air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityClass {
    StrongStability,
    ModerateStability,
    SlightStability,
    Neutral,
    MildInstability,
    ModerateInstability,
    StrongInstability,
}

impl StabilityClass {
    pub fn from_index(index: f64) -> Option<Self> {
        if !index.is_finite() {
            return None;
        }
        let class = if index <= -0.8 {
            Self::StrongStability
        } else if index <= -0.4 {
            Self::ModerateStability
        } else if index <= -0.1 {
            Self::SlightStability
        } else if index < 0.1 {
            Self::Neutral
        } else if index < 0.4 {
            Self::MildInstability
        } else if index < 0.8 {
            Self::ModerateInstability
        } else {
            Self::StrongInstability
        };
        Some(class)
    }
}

/// Dewpoint spread, stability index and spread trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityResult {
    /// Temperature minus dewpoint of the newest reading (°C)
    pub dewpoint_spread: f64,
    /// Pearson correlation of temperature against humidity
    pub stability_index: Correlation,
    pub trend: StabilityTrend,
}

impl StabilityResult {
    /// Classification of the stability index, `None` when it is undefined.
    pub fn classification(&self) -> Option<StabilityClass> {
        self.stability_index
            .coefficient()
            .and_then(StabilityClass::from_index)
    }
}

impl Default for StabilityResult {
    fn default() -> Self {
        Self {
            dewpoint_spread: 0.0,
            stability_index: Correlation::Coefficient(0.0),
            trend: StabilityTrend::Stable,
        }
    }
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Human-facing alert derived from the current cycle's analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
    pub description: String,
}

impl Alert {
    pub fn new(severity: AlertSeverity, message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            description: description.into(),
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Everything the primary cycle publishes. Replaced wholesale each cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub pressure_trends: PressureTrends,
    pub temperature_humidity: StabilityResult,
    pub alerts: Vec<Alert>,
    /// Valid readings the snapshot was computed from
    pub reading_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisSnapshot {
    /// Degraded snapshot for when too few valid readings are available:
    /// every window stable at zero rate, neutral stability, one medium alert.
    pub fn insufficient_data(reading_count: usize, alert: Alert) -> Self {
        Self {
            pressure_trends: PressureTrends::default(),
            temperature_humidity: StabilityResult::default(),
            alerts: vec![alert],
            reading_count,
            generated_at: Utc::now(),
        }
    }

    pub fn highest_severity(&self) -> Option<AlertSeverity> {
        self.alerts.iter().map(|a| a.severity).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_serializes_kebab_case() {
        let json = serde_json::to_string(&PressurePattern::RapidFall).unwrap();
        assert_eq!(json, "\"rapid-fall\"");
        assert_eq!(PressurePattern::RapidRise.to_string(), "rapid-rise");
    }

    #[test]
    fn test_undefined_correlation_serializes_as_null() {
        let json = serde_json::to_string(&Correlation::Undefined).unwrap();
        assert_eq!(json, "null");
        assert!(Correlation::Undefined.value().is_nan());

        let parsed: Correlation = serde_json::from_str("-0.5").unwrap();
        assert_eq!(parsed, Correlation::Coefficient(-0.5));
    }

    #[test]
    fn test_snapshot_keys_are_camel_case() {
        let snapshot = AnalysisSnapshot::insufficient_data(3, Alert::new(AlertSeverity::Medium, "a", "b"));
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["pressureTrends"]["mediumTerm"]["rate"], 0.0);
        assert_eq!(json["temperatureHumidity"]["dewpointSpread"], 0.0);
        assert_eq!(json["temperatureHumidity"]["stabilityIndex"], 0.0);
        assert_eq!(json["readingCount"], 3);
        assert!(json["generatedAt"].is_string());

        let parsed: AnalysisSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_stability_class_bands() {
        assert_eq!(StabilityClass::from_index(-0.95), Some(StabilityClass::StrongStability));
        assert_eq!(StabilityClass::from_index(-0.8), Some(StabilityClass::StrongStability));
        assert_eq!(StabilityClass::from_index(-0.5), Some(StabilityClass::ModerateStability));
        assert_eq!(StabilityClass::from_index(0.0), Some(StabilityClass::Neutral));
        assert_eq!(StabilityClass::from_index(0.1), Some(StabilityClass::MildInstability));
        assert_eq!(StabilityClass::from_index(0.8), Some(StabilityClass::StrongInstability));
        assert_eq!(StabilityClass::from_index(f64::NAN), None);
    }

    #[test]
    fn test_highest_severity() {
        let snapshot = AnalysisSnapshot {
            pressure_trends: PressureTrends::default(),
            temperature_humidity: StabilityResult::default(),
            alerts: vec![
                Alert::new(AlertSeverity::Medium, "a", "b"),
                Alert::new(AlertSeverity::High, "c", "d"),
            ],
            reading_count: 10,
            generated_at: Utc::now(),
        };
        assert_eq!(snapshot.highest_severity(), Some(AlertSeverity::High));
    }
}
