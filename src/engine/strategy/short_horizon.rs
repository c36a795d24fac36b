//! Short-Horizon Strategy
//!
//! Ordinary-least-squares line over (elapsed seconds, value) across the full
//! history, extrapolated over the horizon. Three safeguards keep the line
//! honest on thin or noisy data:
//!
//! - the per-hour rate is clamped to ±`slope_clamp_ratio` × |anchor| so a
//!   brief transient cannot produce an absurd extrapolation;
//! - the forecast is anchored at the smoothed current value, so continuity
//!   with history holds by construction;
//! - a perfectly flat series forces the slope to zero and substitutes a
//!   synthetic noise floor (`noise_floor_ratio` × |anchor|) for the zero
//!   trailing standard deviation.
//!
//! This strategy is closed-form and never declines.

use chrono::Duration;

use super::Forecast;
use crate::config::EngineConfig;
use crate::engine::stats;
use crate::types::{ForecastPoint, MetricSeries, StrategyKind};

/// 95% two-sided z multiplier for the confidence band.
const Z_95: f64 = 1.96;

/// Fit and extrapolate. Always returns a forecast.
pub fn forecast(series: &MetricSeries, anchor: f64, config: &EngineConfig) -> Forecast {
    let values = series.values();
    let origin = series
        .last_timestamp()
        .unwrap_or_else(chrono::Utc::now);

    let slope_per_hour = clamped_slope(series, anchor, config);

    let trailing_std = stats::std_dev(&values);
    let band_scale = if trailing_std > 0.0 {
        trailing_std
    } else {
        noise_floor(anchor, config)
    };

    let step_hours = config.step_minutes as f64 / 60.0;
    let points = (1..=config.forecast_steps())
        .map(|step| {
            let dt_hours = step as f64 * step_hours;
            let value = anchor + slope_per_hour * dt_hours;
            // Uncertainty grows with the square root of elapsed steps.
            let band = Z_95 * band_scale * (step as f64).sqrt();
            ForecastPoint {
                timestamp: origin + Duration::minutes(config.step_minutes * step as i64),
                value,
                confidence_low: value - band,
                confidence_high: value + band,
                is_future: true,
            }
        })
        .collect();

    Forecast {
        strategy: StrategyKind::ShortHorizon,
        origin,
        origin_value: anchor,
        points,
    }
}

/// OLS slope in units per hour, clamped to the configured fraction of the
/// anchor magnitude. A flat series yields exactly zero.
fn clamped_slope(series: &MetricSeries, anchor: f64, config: &EngineConfig) -> f64 {
    let first_ts = match series.points.first() {
        Some(p) => p.timestamp,
        None => return 0.0,
    };

    let xs: Vec<f64> = series
        .points
        .iter()
        .map(|p| (p.timestamp - first_ts).num_milliseconds() as f64 / 1000.0)
        .collect();
    let ys = series.values();

    if stats::std_dev(&ys) == 0.0 {
        return 0.0;
    }

    let mean_x = stats::mean(&xs);
    let mean_y = stats::mean(&ys);

    let numerator: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let denominator: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();

    if denominator == 0.0 {
        return 0.0;
    }

    let per_hour = numerator / denominator * 3600.0;
    let max_rate = config.slope_clamp_ratio * anchor.abs();
    per_hour.clamp(-max_rate, max_rate)
}

/// Synthetic band width for zero-variance series: ~1% of anchor magnitude,
/// with a small absolute floor for anchors at zero.
fn noise_floor(anchor: f64, config: &EngineConfig) -> f64 {
    let floor = config.noise_floor_ratio * anchor.abs();
    if floor > 0.0 {
        floor
    } else {
        config.noise_floor_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::anchor::smoothed_anchor;
    use crate::engine::strategy::test_support::make_series;
    use chrono::Duration;

    #[test]
    fn flat_series_forecasts_flat_with_nonzero_band() {
        let config = EngineConfig::default();
        let values = vec![50.0; 24];
        let series = make_series(&values, Duration::hours(1));

        let result = forecast(&series, 50.0, &config);
        for point in &result.points {
            assert!((point.value - 50.0).abs() < 1e-9);
            assert!(point.confidence_high > point.value);
            assert!(point.confidence_low < point.value);
        }
    }

    #[test]
    fn band_widens_with_elapsed_steps() {
        let config = EngineConfig::default();
        let values: Vec<f64> = (0..24).map(|i| 10.0 + (i % 3) as f64).collect();
        let series = make_series(&values, Duration::hours(1));
        let anchor = smoothed_anchor(&values, config.ewma_span);

        let result = forecast(&series, anchor, &config);
        let first = result.points.first().expect("non-empty");
        let last = result.points.last().expect("non-empty");
        let first_width = first.confidence_high - first.confidence_low;
        let last_width = last.confidence_high - last.confidence_low;
        assert!(last_width > first_width * 5.0);
    }

    #[test]
    fn steep_transient_rate_is_clamped() {
        let config = EngineConfig::default();
        // 30 units/hour slope against an anchor near 25: far beyond the
        // ±10%/h clamp.
        let values: Vec<f64> = (0..6).map(|i| 10.0 + i as f64 * 30.0).collect();
        let series = make_series(&values, Duration::hours(1));
        let anchor = smoothed_anchor(&values, config.ewma_span);

        let result = forecast(&series, anchor, &config);
        let max_rate = config.slope_clamp_ratio * anchor.abs();
        let last = result.points.last().expect("non-empty");
        let implied_rate = (last.value - anchor) / config.horizon_hours;
        assert!(implied_rate <= max_rate + 1e-9);
    }

    #[test]
    fn forecast_starts_at_the_anchor() {
        let config = EngineConfig::default();
        let values: Vec<f64> = (0..12).map(|i| 40.0 + i as f64).collect();
        let series = make_series(&values, Duration::hours(1));
        let anchor = smoothed_anchor(&values, config.ewma_span);

        let result = forecast(&series, anchor, &config);
        assert!((result.origin_value - anchor).abs() < f64::EPSILON);
        let first = result.points.first().expect("non-empty");
        let step_hours = config.step_minutes as f64 / 60.0;
        // One step out, the line has moved at most one clamped step from
        // the anchor.
        assert!((first.value - anchor).abs() <= config.slope_clamp_ratio * anchor.abs() * step_hours + 1e-9);
    }

    #[test]
    fn confidence_invariant_holds_everywhere() {
        let config = EngineConfig::default();
        let values: Vec<f64> = (0..36).map(|i| 5.0 + (i as f64 * 0.7).cos()).collect();
        let series = make_series(&values, Duration::minutes(30));
        let anchor = smoothed_anchor(&values, config.ewma_span);

        let result = forecast(&series, anchor, &config);
        for point in &result.points {
            assert!(point.confidence_low <= point.value);
            assert!(point.value <= point.confidence_high);
        }
    }
}
