//! Long-Horizon Strategy
//!
//! Trend + additive daily seasonality, fitted by recency-weighted ridge
//! least squares over the full history. The basis is a linear trend plus the
//! first few Fourier harmonics of the 24 h cycle; weekly and yearly terms
//! stay disabled because reading cadence and retention make them unreliable.
//!
//! Two corrections are applied to the raw model output:
//!
//! - **Continuity offset**: the fitted curve at the last real timestamp
//!   rarely equals the smoothed anchor, so `anchor - model(t_last)` is added
//!   to every future value and both confidence bounds. The forecast then
//!   starts exactly at the anchor with no visible discontinuity.
//! - **Safety clamp**: adjusted values are clipped to
//!   `[0, clamp_ceiling_factor × historical_max]`, which suppresses runaway
//!   extrapolation while still permitting genuine spikes up to double the
//!   worst historical reading. The upper confidence bound may extend to
//!   1.2 × the ceiling.
//!
//! The strategy declines (returns `None`) on near-zero variance, a singular
//! fit, or an empty post-clamp future slice.

use chrono::{DateTime, Duration, Utc};

use super::Forecast;
use crate::config::EngineConfig;
use crate::engine::stats;
use crate::types::{ForecastPoint, MetricSeries, StrategyKind};

/// 95% two-sided z multiplier for the confidence band.
const Z_95: f64 = 1.96;

/// Relative variance floor below which the fit is pointless.
const NEAR_ZERO_VARIANCE: f64 = 1e-9;

/// Period of the only enabled seasonal cycle, in hours.
const DAILY_PERIOD_HOURS: f64 = 24.0;

/// Attempt a seasonal forecast. `None` means "not applicable" and the caller
/// falls back to the short-horizon line.
pub fn try_forecast(
    series: &MetricSeries,
    anchor: f64,
    config: &EngineConfig,
) -> Option<Forecast> {
    let values = series.values();
    let std = stats::std_dev(&values);
    let mean = stats::mean(&values);
    if std <= NEAR_ZERO_VARIANCE * mean.abs().max(1.0) {
        return None;
    }

    let first_ts = series.points.first()?.timestamp;
    let origin = series.last_timestamp()?;

    let fit = fit_seasonal_trend(series, config)?;

    let tau_origin = hours_since(first_ts, origin);
    let offset = anchor - fit.predict(tau_origin);

    let historical_max = series.historical_max();
    let ceiling = if historical_max > 0.0 {
        historical_max * config.clamp_ceiling_factor
    } else {
        config.clamp_fallback_ceiling
    };

    let steps = config.forecast_steps();
    let step_hours = config.step_minutes as f64 / 60.0;
    let mut points = Vec::with_capacity(steps);

    for step in 1..=steps {
        let tau = tau_origin + step as f64 * step_hours;
        let raw = fit.predict(tau) + offset;
        if !raw.is_finite() {
            return None;
        }

        let band = Z_95 * fit.residual_std * (1.0 + step as f64 / steps as f64).sqrt();
        let value = raw.clamp(0.0, ceiling);
        let confidence_low = (raw - band).clamp(0.0, value);
        let confidence_high = (raw + band).min(ceiling * 1.2).max(value);

        points.push(ForecastPoint {
            timestamp: origin + Duration::minutes(config.step_minutes * step as i64),
            value,
            confidence_low,
            confidence_high,
            is_future: true,
        });
    }

    if points.is_empty() {
        return None;
    }

    Some(Forecast {
        strategy: StrategyKind::LongHorizon,
        origin,
        origin_value: anchor,
        points,
    })
}

fn hours_since(start: DateTime<Utc>, ts: DateTime<Utc>) -> f64 {
    (ts - start).num_milliseconds() as f64 / 3_600_000.0
}

/// Fitted model: `y(τ) = β0 + β1·τ + Σ βk·{sin,cos}(2πkτ/24)`.
struct SeasonalFit {
    beta: Vec<f64>,
    harmonics: usize,
    residual_std: f64,
}

impl SeasonalFit {
    fn predict(&self, tau_hours: f64) -> f64 {
        basis(tau_hours, self.harmonics)
            .iter()
            .zip(&self.beta)
            .map(|(x, b)| x * b)
            .sum()
    }
}

/// Regression basis at elapsed time τ (hours since first observation).
fn basis(tau_hours: f64, harmonics: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + 2 * harmonics);
    row.push(1.0);
    row.push(tau_hours);
    for k in 1..=harmonics {
        let angle = 2.0 * std::f64::consts::PI * k as f64 * tau_hours / DAILY_PERIOD_HOURS;
        row.push(angle.sin());
        row.push(angle.cos());
    }
    row
}

/// Recency-weighted ridge least squares over the full history.
///
/// Sample weights decay with a configurable half-life so the trend adapts to
/// recent level changes; the ridge penalty applies to the seasonal columns
/// only and scales inversely with `seasonality_weight`. Returns `None` when
/// the normal equations are singular.
fn fit_seasonal_trend(series: &MetricSeries, config: &EngineConfig) -> Option<SeasonalFit> {
    let harmonics = config.seasonal_harmonics;
    let dim = 2 + 2 * harmonics;
    let first_ts = series.points.first()?.timestamp;
    let last_ts = series.last_timestamp()?;
    let tau_last = hours_since(first_ts, last_ts);

    let half_life = config.trend_half_life_hours.max(1e-3);

    let mut xtx = vec![vec![0.0_f64; dim]; dim];
    let mut xty = vec![0.0_f64; dim];
    let mut weight_sum = 0.0;

    let mut rows = Vec::with_capacity(series.points.len());
    for point in &series.points {
        let tau = hours_since(first_ts, point.timestamp);
        let weight = 0.5_f64.powf((tau_last - tau) / half_life);
        let row = basis(tau, harmonics);
        for i in 0..dim {
            for j in 0..dim {
                xtx[i][j] += weight * row[i] * row[j];
            }
            xty[i] += weight * row[i] * point.value;
        }
        weight_sum += weight;
        rows.push((row, point.value, weight));
    }

    // Ridge on seasonal columns: shrink the daily cycle toward zero unless
    // the data supports it. Trend columns stay unpenalized.
    let ridge = weight_sum / config.seasonality_weight.max(1e-6);
    for (i, row) in xtx.iter_mut().enumerate().skip(2) {
        row[i] += ridge;
    }

    let beta = solve(xtx, xty)?;
    if beta.iter().any(|b| !b.is_finite()) {
        return None;
    }

    // Weighted residual standard deviation feeds the confidence band.
    let mut weighted_sse = 0.0;
    for (row, y, weight) in &rows {
        let fitted: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
        weighted_sse += weight * (y - fitted).powi(2);
    }
    let residual_std = if weight_sum > 0.0 {
        (weighted_sse / weight_sum).sqrt()
    } else {
        0.0
    };

    Some(SeasonalFit {
        beta,
        harmonics,
        residual_std,
    })
}

/// Gaussian elimination with partial pivoting on the (small) normal system.
/// `None` when a pivot collapses, i.e. the system is singular.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for col in (row + 1)..n {
            sum -= a[row][col] * x[col];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::anchor::smoothed_anchor;
    use crate::engine::strategy::test_support::make_series;
    use chrono::Duration;

    fn daily_cycle_series(hours: usize) -> MetricSeries {
        let values: Vec<f64> = (0..hours)
            .map(|h| {
                let phase = 2.0 * std::f64::consts::PI * h as f64 / 24.0;
                60.0 + 8.0 * phase.sin() + h as f64 * 0.05
            })
            .collect();
        make_series(&values, Duration::hours(1))
    }

    #[test]
    fn declines_on_zero_variance() {
        let config = EngineConfig::default();
        let series = make_series(&vec![50.0; 200], Duration::hours(1));
        assert!(try_forecast(&series, 50.0, &config).is_none());
    }

    #[test]
    fn continuity_offset_pins_forecast_to_anchor_at_origin() {
        let config = EngineConfig::default();
        let series = daily_cycle_series(120);
        let anchor = smoothed_anchor(&series.values(), config.ewma_span);

        let fit = fit_seasonal_trend(&series, &config).expect("fit should succeed");
        let tau_origin = hours_since(
            series.points[0].timestamp,
            series.last_timestamp().expect("non-empty"),
        );
        let offset = anchor - fit.predict(tau_origin);

        // At the last real timestamp, model + offset is the anchor exactly.
        assert!((fit.predict(tau_origin) + offset - anchor).abs() < 1e-9);

        // And the first 10-minute step stays in the anchor's neighborhood.
        let forecast = try_forecast(&series, anchor, &config).expect("should forecast");
        let first = forecast.points.first().expect("non-empty");
        assert!((first.value - anchor).abs() < 0.05 * anchor.abs());
    }

    #[test]
    fn values_respect_the_safety_clamp() {
        let config = EngineConfig::default();
        let series = daily_cycle_series(200);
        let anchor = smoothed_anchor(&series.values(), config.ewma_span);
        let ceiling = series.historical_max() * config.clamp_ceiling_factor;

        let forecast = try_forecast(&series, anchor, &config).expect("should forecast");
        for point in &forecast.points {
            assert!(point.value >= 0.0);
            assert!(point.value <= ceiling + 1e-9);
            assert!(point.confidence_low <= point.value);
            assert!(point.value <= point.confidence_high);
            assert!(point.confidence_high <= ceiling * 1.2 + 1e-9);
        }
    }

    #[test]
    fn learns_an_upward_trend() {
        let config = EngineConfig::default();
        // 1 unit/hour ramp with mild noise-free daily wiggle.
        let values: Vec<f64> = (0..96)
            .map(|h| {
                100.0 + h as f64 + 2.0 * (2.0 * std::f64::consts::PI * h as f64 / 24.0).cos()
            })
            .collect();
        let series = make_series(&values, Duration::hours(1));
        let anchor = smoothed_anchor(&values, config.ewma_span);

        let forecast = try_forecast(&series, anchor, &config).expect("should forecast");
        // 24 h ahead the model should sit well above the anchor.
        assert!(forecast.predicted_24h() > anchor + 12.0);
    }

    #[test]
    fn singular_system_is_a_decline_not_a_panic() {
        // Two values at the same instant: the trend column is identically
        // zero, the pivot collapses, and the fit declines.
        let config = EngineConfig::default();
        let series = make_series(&[1.0, 2.0], Duration::zero());
        assert!(try_forecast(&series, 1.5, &config).is_none());
    }

    #[test]
    fn solver_handles_a_known_system() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];
        let x = solve(a, b).expect("non-singular");
        assert!((x[0] - 1.0).abs() < 1e-9);
        assert!((x[1] - 3.0).abs() < 1e-9);
    }
}
