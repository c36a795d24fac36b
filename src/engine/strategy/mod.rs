//! Forecasting strategies and the duration-based dispatcher.
//!
//! Two interchangeable forecasters produce the future points for a metric:
//!
//! - **Short-horizon**: closed-form robust linear extrapolation. Always
//!   succeeds.
//! - **Long-horizon**: trend + additive daily seasonality with a continuity
//!   offset. May decline.
//!
//! "Declined" is an explicit `Option` return, not a caught fault: a strategy
//! hands back either a [`Forecast`] or `None`, and the selector's fallback
//! is a plain data-dependent branch.

mod long_horizon;
mod short_horizon;

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::types::{ForecastPoint, MetricSeries, StrategyKind};

/// Output of a forecasting strategy: future points at native resolution.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub strategy: StrategyKind,
    /// Timestamp of the last real observation; forecast steps count from here.
    pub origin: DateTime<Utc>,
    /// Forecast value at the origin. Equal to the anchor by construction for
    /// both strategies, which is what keeps the fused chart continuous.
    pub origin_value: f64,
    /// Future points, `is_future = true`, first point one step after origin.
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// The 24 h-ahead prediction: the last point of the horizon.
    pub fn predicted_24h(&self) -> f64 {
        self.points.last().map_or(self.origin_value, |p| p.value)
    }
}

/// Pick a strategy for this series and run it.
///
/// Seasonal fitting needs enough history to estimate daily-cycle terms
/// reliably; below the configured duration threshold the short-horizon line
/// is used directly. Above it, the long-horizon model is attempted and the
/// short-horizon line remains the fallback when it declines.
pub fn select_forecast(series: &MetricSeries, anchor: f64, config: &EngineConfig) -> Forecast {
    let history_hours = series.duration().num_seconds() as f64 / 3600.0;

    if history_hours < config.long_horizon_min_history_hours {
        tracing::debug!(
            metric = %series.metric,
            history_hours,
            "History below seasonal threshold, using short-horizon strategy"
        );
        return short_horizon::forecast(series, anchor, config);
    }

    match long_horizon::try_forecast(series, anchor, config) {
        Some(forecast) => forecast,
        None => {
            tracing::debug!(
                metric = %series.metric,
                "Long-horizon strategy declined, falling back to short-horizon"
            );
            short_horizon::forecast(series, anchor, config)
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{MetricSeries, SeriesPoint};
    use chrono::{Duration, TimeZone, Utc};

    /// Build a series with fixed spacing between points.
    pub fn make_series(values: &[f64], spacing: Duration) -> MetricSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        MetricSeries {
            sensor_id: "S-1".to_string(),
            category: "mechanical".to_string(),
            metric: "vibration".to_string(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, &v)| SeriesPoint {
                    timestamp: start + spacing * i as i32,
                    value: v,
                })
                .collect(),
        }
    }
}
