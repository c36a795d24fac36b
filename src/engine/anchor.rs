//! Anchor Estimator
//!
//! The "current value" every downstream check uses is an exponentially
//! weighted moving average over the series, not the raw last sample. A
//! single noisy reading at the tail of the history would otherwise flip
//! status and trend classifications from one request to the next.

/// Smoothed current value: EWMA with `alpha = 2 / (span + 1)` over the full
/// series in chronological order. Degenerates to the last raw value when the
/// series has fewer than 2 points.
pub fn smoothed_anchor(values: &[f64], span: usize) -> f64 {
    match values {
        [] => 0.0,
        [only] => *only,
        [first, rest @ ..] => {
            let alpha = 2.0 / (span as f64 + 1.0);
            rest.iter()
                .fold(*first, |ewma, &v| alpha * v + (1.0 - alpha) * ewma)
        }
    }
}
