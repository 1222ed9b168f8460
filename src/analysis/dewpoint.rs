//! Magnus-formula dewpoint
//!
//! γ = a·T / (b + T) + ln(RH / 100)
//! Td = b·γ / (a − γ)

/// Magnus coefficient `a` (dimensionless).
pub const MAGNUS_A: f64 = 17.27;

/// Magnus coefficient `b` (°C).
pub const MAGNUS_B: f64 = 237.7;

/// Dewpoint (°C) from air temperature (°C) and relative humidity (%).
///
/// Defined for humidity in (0, 100]. Humidity of 0 gives `ln(0) = -inf` and
/// a meaningless result; validated readings never carry it.
pub fn dewpoint(temperature_c: f64, humidity_pct: f64) -> f64 {
    let gamma = (MAGNUS_A * temperature_c) / (MAGNUS_B + temperature_c) + (humidity_pct / 100.0).ln();
    (MAGNUS_B * gamma) / (MAGNUS_A - gamma)
}

/// Dewpoint, or `None` when the inputs are outside the model's domain.
pub fn dewpoint_checked(temperature_c: f64, humidity_pct: f64) -> Option<f64> {
    if !temperature_c.is_finite() || !(humidity_pct > 0.0 && humidity_pct <= 100.0) {
        return None;
    }
    Some(dewpoint(temperature_c, humidity_pct)).filter(|td| td.is_finite())
}

/// Air temperature minus dewpoint (°C).
pub fn dewpoint_spread(temperature_c: f64, humidity_pct: f64) -> f64 {
    temperature_c - dewpoint(temperature_c, humidity_pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturated_air_dewpoint_equals_temperature() {
        for t in [-20.0, -5.0, 0.0, 12.5, 20.0, 35.0] {
            assert!((dewpoint(t, 100.0) - t).abs() < 1e-9, "t = {}", t);
        }
    }

    #[test]
    fn test_known_value() {
        // 20 °C at 50 % RH is about 9.3 °C
        let td = dewpoint(20.0, 50.0);
        assert!((td - 9.26).abs() < 0.05, "got {}", td);
    }

    #[test]
    fn test_dewpoint_below_temperature_when_unsaturated() {
        assert!(dewpoint_spread(25.0, 40.0) > 0.0);
        assert!(dewpoint_spread(25.0, 99.0) < 0.5);
    }

    #[test]
    fn test_checked_domain() {
        assert_eq!(dewpoint_checked(20.0, 0.0), None);
        assert_eq!(dewpoint_checked(20.0, 101.0), None);
        assert_eq!(dewpoint_checked(f64::NAN, 50.0), None);
        assert!(dewpoint_checked(20.0, 50.0).is_some());
    }
}
