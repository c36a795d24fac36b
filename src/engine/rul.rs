//! RUL Estimator
//!
//! Walks the selected strategy's future points in chronological order at
//! their native resolution — a coarser scan would skip early breaches and
//! overstate the remaining life. The returned value is the offset from the
//! last real sample to the first breaching point, in hours, floored at the
//! configured minimum. `None` means no breach inside the forecast horizon.

use super::strategy::Forecast;
use crate::types::MetricConfig;

/// Hours until the forecast first crosses a configured bound.
///
/// The crossing check is inclusive (`>= max`, `<= min`): a point projected
/// to sit exactly on the limit counts as a breach.
pub fn estimate(forecast: &Forecast, bounds: &MetricConfig, min_rul_hours: f64) -> Option<f64> {
    if bounds.min.is_none() && bounds.max.is_none() {
        return None;
    }

    for point in &forecast.points {
        let crossed = bounds.max.is_some_and(|max| point.value >= max)
            || bounds.min.is_some_and(|min| point.value <= min);
        if crossed {
            let hours = (point.timestamp - forecast.origin).num_seconds() as f64 / 3600.0;
            return Some(hours.max(min_rul_hours));
        }
    }
    None
}
