//! Alert rules over the current cycle's trends and stability.
//!
//! Rules are evaluated independently and in a fixed order; several may fire
//! at once and the result may be empty. Nothing carries over between cycles.

use crate::config::AlertConfig;
use crate::types::{Alert, AlertSeverity, PressureTrends, StabilityResult};

use super::trend::exceeds;

pub const RAPID_RISE_MESSAGE: &str = "Rapid pressure rise detected";
pub const RAPID_FALL_MESSAGE: &str = "Rapid pressure fall detected";
pub const RAPID_CHANGE_DESCRIPTION: &str = "Significant weather changes likely in the next 6-12 hours";

pub const PRECIPITATION_MESSAGE: &str = "Conditions favorable for precipitation or fog";
pub const PRECIPITATION_DESCRIPTION: &str = "High humidity with temperature close to dewpoint";

pub const INSUFFICIENT_DATA_MESSAGE: &str = "Insufficient data for analysis";
pub const INSUFFICIENT_DATA_DESCRIPTION: &str = "More data collection is needed for accurate forecasts";

#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    config: AlertConfig,
}

impl AlertEngine {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, trends: &PressureTrends, stability: &StabilityResult) -> Vec<Alert> {
        let mut alerts = Vec::new();

        let rate = trends.short_term.rate;
        if exceeds(rate.abs(), self.config.pressure_rate_hpa_per_hour) {
            let message = if rate > 0.0 {
                RAPID_RISE_MESSAGE
            } else {
                RAPID_FALL_MESSAGE
            };
            alerts.push(Alert::new(AlertSeverity::High, message, RAPID_CHANGE_DESCRIPTION));
        }

        if stability.dewpoint_spread < self.config.dewpoint_spread_c {
            alerts.push(Alert::new(
                AlertSeverity::High,
                PRECIPITATION_MESSAGE,
                PRECIPITATION_DESCRIPTION,
            ));
        }

        alerts
    }

    /// The single alert carried by a degraded snapshot.
    pub fn insufficient_data() -> Alert {
        Alert::new(
            AlertSeverity::Medium,
            INSUFFICIENT_DATA_MESSAGE,
            INSUFFICIENT_DATA_DESCRIPTION,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Correlation, PressurePattern, StabilityTrend, TrendResult};

    fn trends(short_rate: f64) -> PressureTrends {
        PressureTrends {
            short_term: TrendResult {
                rate: short_rate,
                pattern: PressurePattern::Stable,
            },
            ..Default::default()
        }
    }

    fn stability(spread: f64) -> StabilityResult {
        StabilityResult {
            dewpoint_spread: spread,
            stability_index: Correlation::Coefficient(-0.5),
            trend: StabilityTrend::Stable,
        }
    }

    #[test]
    fn test_quiet_conditions_produce_no_alerts() {
        let engine = AlertEngine::default();
        assert!(engine.evaluate(&trends(0.01), &stability(8.0)).is_empty());
    }

    #[test]
    fn test_rapid_fall_alert() {
        let engine = AlertEngine::default();
        let alerts = engine.evaluate(&trends(-0.15), &stability(8.0));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[0].message, RAPID_FALL_MESSAGE);
        assert_eq!(alerts[0].description, RAPID_CHANGE_DESCRIPTION);
    }

    #[test]
    fn test_rate_on_threshold_does_not_alert() {
        let engine = AlertEngine::default();
        assert!(engine.evaluate(&trends(0.06), &stability(8.0)).is_empty());
        let alerts = engine.evaluate(&trends(0.061), &stability(8.0));
        assert_eq!(alerts[0].message, RAPID_RISE_MESSAGE);
    }

    #[test]
    fn test_float_noise_on_threshold_does_not_alert() {
        let engine = AlertEngine::default();
        // Mean of hourly 0.06 hPa steps as computed in floating point
        assert!(engine.evaluate(&trends(0.06000000000000227), &stability(8.0)).is_empty());
        assert!(engine.evaluate(&trends(-0.06000000000000227), &stability(8.0)).is_empty());
    }

    #[test]
    fn test_rules_fire_independently_in_order() {
        let engine = AlertEngine::default();
        let alerts = engine.evaluate(&trends(0.2), &stability(1.0));
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].message, RAPID_RISE_MESSAGE);
        assert_eq!(alerts[1].message, PRECIPITATION_MESSAGE);
    }

    #[test]
    fn test_low_spread_only() {
        let engine = AlertEngine::default();
        let alerts = engine.evaluate(&trends(0.0), &stability(2.49));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, PRECIPITATION_MESSAGE);
        assert!(engine.evaluate(&trends(0.0), &stability(2.5)).is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let engine = AlertEngine::new(AlertConfig {
            pressure_rate_hpa_per_hour: 0.5,
            dewpoint_spread_c: 1.0,
        });
        assert!(engine.evaluate(&trends(0.3), &stability(2.0)).is_empty());
    }
}
