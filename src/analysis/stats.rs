//! Numeric primitives tolerant of missing values
//!
//! Every function accepts either `&[f64]` or `&[Option<f64>]`. `None`, NaN and
//! infinities count as missing and are dropped before computing. Results that
//! cannot be computed are returned as `None` ("unavailable") rather than NaN.

use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::types::Correlation;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsError {
    #[error("Cannot compute statistic over an empty sequence")]
    EmptyInput,
}

/// Finite values only, in order.
pub fn finite_values<T: Copy + Into<Option<f64>>>(xs: &[T]) -> Vec<f64> {
    xs.iter()
        .filter_map(|&x| finite(x.into()))
        .collect()
}

fn finite(x: Option<f64>) -> Option<f64> {
    x.filter(|v| v.is_finite())
}

/// Arithmetic mean.
///
/// Does not filter: a non-finite entry propagates into the result.
pub fn mean(xs: &[f64]) -> Result<f64, StatsError> {
    if xs.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    Ok(xs.iter().mean())
}

/// Population standard deviation (divides by N) over the finite entries.
pub fn standard_deviation<T: Copy + Into<Option<f64>>>(xs: &[T]) -> Option<f64> {
    let valid = finite_values(xs);
    if valid.is_empty() {
        return None;
    }
    Some(valid.iter().population_std_dev())
}

/// Pearson correlation over index-aligned pairs.
///
/// Pairs where either side is missing are dropped. Returns `None` when no
/// pair survives and `Correlation::Undefined` when either side has zero
/// variance.
pub fn pearson_correlation<T, U>(xs: &[T], ys: &[U]) -> Option<Correlation>
where
    T: Copy + Into<Option<f64>>,
    U: Copy + Into<Option<f64>>,
{
    let pairs = valid_pairs(xs, ys);
    pearson_from_pairs(&pairs)
}

/// Index-aligned pairs where both sides are finite.
///
/// When the slices differ in length only the common prefix is paired.
pub fn valid_pairs<T, U>(xs: &[T], ys: &[U]) -> Vec<(f64, f64)>
where
    T: Copy + Into<Option<f64>>,
    U: Copy + Into<Option<f64>>,
{
    xs.iter()
        .zip(ys.iter())
        .filter_map(|(&x, &y)| Some((finite(x.into())?, finite(y.into())?)))
        .collect()
}

/// Pearson correlation of already-validated pairs.
///
/// Formula: r = Σ[(xi - x̄)(yi - ȳ)] / sqrt(Σ(xi - x̄)² × Σ(yi - ȳ)²)
pub fn pearson_from_pairs(pairs: &[(f64, f64)]) -> Option<Correlation> {
    if pairs.is_empty() {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return Some(Correlation::Undefined);
    }

    Some(Correlation::Coefficient((covariance / denominator).clamp(-1.0, 1.0)))
}

/// Two-tailed p-value for a Pearson r over `n` pairs.
///
/// t = r × sqrt(n-2) / sqrt(1-r²), Student's t with n-2 degrees of freedom.
pub fn correlation_p_value(r: f64, n: usize) -> Option<f64> {
    if n < 3 || !r.is_finite() {
        return None;
    }

    // Perfect or near-perfect correlation is highly significant
    if r.abs() >= 0.9999 {
        return Some(0.0);
    }

    let df = (n - 2) as f64;
    let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();

    StudentsT::new(0.0, 1.0, df)
        .ok()
        .map(|dist| 2.0 * (1.0 - dist.cdf(t_stat.abs())))
}

/// Simple trailing moving average over the finite entries.
///
/// Output has `valid_len - period + 1` values, oldest window first. `None`
/// when `period` is zero or fewer than `period` valid values exist.
pub fn moving_average<T: Copy + Into<Option<f64>>>(xs: &[T], period: usize) -> Option<Vec<f64>> {
    if period == 0 {
        return None;
    }
    let valid = finite_values(xs);
    if valid.len() < period {
        return None;
    }

    let divisor = period as f64;
    Some(
        valid
            .windows(period)
            .map(|window| window.iter().sum::<f64>() / divisor)
            .collect(),
    )
}
