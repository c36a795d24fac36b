//! Series statistics shared across the analysis stages.
//!
//! Thin wrappers over statrs plus the two derived measures the risk and
//! recommendation stages rely on: volatility (coefficient of variation of
//! the raw history) and historical anomaly density (points beyond a sigma
//! band around the raw mean).

use statrs::statistics::Statistics;

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Statistics::mean(values)
}

/// Sample standard deviation (n-1 denominator). Zero when fewer than 2 values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    Statistics::std_dev(values)
}

/// Coefficient of variation: std-dev over |mean|. Zero when the mean is zero,
/// so a signal centered on zero never reads as infinitely volatile.
pub fn volatility(values: &[f64]) -> f64 {
    let mean = mean(values);
    if mean == 0.0 {
        return 0.0;
    }
    std_dev(values) / mean.abs()
}

/// Count raw points more than `sigma` standard deviations from the raw mean.
/// A zero-variance series has no anomalies by definition.
pub fn anomaly_count(values: &[f64], sigma: f64) -> usize {
    let mean = mean(values);
    let std = std_dev(values);
    if std == 0.0 {
        return 0;
    }
    values
        .iter()
        .filter(|&&v| (v - mean).abs() > sigma * std)
        .count()
}
