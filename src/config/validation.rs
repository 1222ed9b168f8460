//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for NowcastConfig.
///
/// Maintained by hand to match the struct hierarchy in nowcast_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [source]
        "source",
        "source.url",
        "source.primary_lookback_hours",
        "source.trends_lookback_hours",
        "source.timeout_secs",
        // [analysis]
        "analysis",
        "analysis.window_size",
        "analysis.short_term_window",
        "analysis.medium_term_window",
        "analysis.long_term_window",
        "analysis.stability_window",
        "analysis.min_valid_readings",
        "analysis.rapid_change_hpa_per_hour",
        "analysis.change_hpa_per_hour",
        "analysis.spread_rate_c_per_hour",
        // [alerts]
        "alerts",
        "alerts.pressure_rate_hpa_per_hour",
        "alerts.dewpoint_spread_c",
        // [statistics]
        "statistics",
        "statistics.moving_average_period",
        "statistics.correlation_window",
        // [scheduler]
        "scheduler",
        "scheduler.primary_interval_secs",
        "scheduler.trends_interval_secs",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Never fails on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Plausibility Checks
// ============================================================================

/// Flag values that are legal but unlikely to be what the operator meant.
pub fn validate_plausibility(config: &super::NowcastConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut warn = |field: &str, message: String| {
        warnings.push(ValidationWarning {
            field: field.to_string(),
            message,
            suggestion: None,
        });
    };

    let a = &config.analysis;
    if a.rapid_change_hpa_per_hour > 1.0 {
        warn(
            "analysis.rapid_change_hpa_per_hour",
            format!(
                "rapid_change_hpa_per_hour = {:.3} is above typical range (0.03-1.0 hPa/h); rapid patterns will almost never fire",
                a.rapid_change_hpa_per_hour
            ),
        );
    }

    let spread = config.alerts.dewpoint_spread_c;
    if !(0.0..=10.0).contains(&spread) {
        warn(
            "alerts.dewpoint_spread_c",
            format!("dewpoint_spread_c = {:.1} is outside typical range (0-10 °C)", spread),
        );
    }

    if config.source.timeout_secs >= config.scheduler.primary_interval_secs {
        warn(
            "source.timeout_secs",
            format!(
                "timeout_secs ({}) is not shorter than primary_interval_secs ({}); a hung source will delay every refresh",
                config.source.timeout_secs, config.scheduler.primary_interval_secs
            ),
        );
    }

    if a.min_valid_readings < a.short_term_window {
        warn(
            "analysis.min_valid_readings",
            format!(
                "min_valid_readings ({}) is below short_term_window ({}); short-term rates may use partial windows",
                a.min_valid_readings, a.short_term_window
            ),
        );
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================
