//! Chart Fuser
//!
//! Merges downsampled raw history with the selected strategy's future points
//! into one ordered visual series. History is sampled uniformly by index —
//! not by time — so the overall shape survives regardless of how long the
//! retained window is. Historical points carry zero-width confidence bands;
//! future points arrive already banded from the strategy.

use super::strategy::Forecast;
use crate::types::{ForecastPoint, MetricSeries, SeriesPoint};

/// Build the fused series: downsampled history first, then every future
/// point. The result is chronologically non-decreasing with all
/// `is_future = false` points strictly before the `is_future = true` ones.
pub fn fuse(series: &MetricSeries, forecast: &Forecast, budget: usize) -> Vec<ForecastPoint> {
    let mut fused: Vec<ForecastPoint> = downsample(&series.points, budget)
        .into_iter()
        .map(|p| ForecastPoint {
            timestamp: p.timestamp,
            value: p.value,
            confidence_low: p.value,
            confidence_high: p.value,
            is_future: false,
        })
        .collect();

    fused.extend(forecast.points.iter().copied());
    fused
}

/// Uniform index sampling down to `budget` points. The final point is always
/// kept so the chart ends at the most recent real observation.
fn downsample(points: &[SeriesPoint], budget: usize) -> Vec<SeriesPoint> {
    if budget == 0 || points.len() <= budget {
        return points.to_vec();
    }

    let step = points.len() as f64 / budget as f64;
    let mut sampled: Vec<SeriesPoint> = (0..budget)
        .map(|i| points[(i as f64 * step) as usize])
        .collect();

    let last = points[points.len() - 1];
    if sampled.last().map(|p| p.timestamp) != Some(last.timestamp) {
        sampled.push(last);
    }
    sampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::strategy::test_support::make_series;
    use crate::types::StrategyKind;
    use chrono::Duration;

    fn make_forecast(series: &MetricSeries, steps: usize) -> Forecast {
        let origin = series.last_timestamp().expect("non-empty");
        Forecast {
            strategy: StrategyKind::ShortHorizon,
            origin,
            origin_value: 0.0,
            points: (1..=steps)
                .map(|i| ForecastPoint {
                    timestamp: origin + Duration::minutes(10 * i as i64),
                    value: 10.0,
                    confidence_low: 9.0,
                    confidence_high: 11.0,
                    is_future: true,
                })
                .collect(),
        }
    }

    #[test]
    fn short_history_passes_through_untouched() {
        let series = make_series(&[1.0, 2.0, 3.0], Duration::hours(1));
        let forecast = make_forecast(&series, 2);
        let fused = fuse(&series, &forecast, 200);
        assert_eq!(fused.len(), 5);
    }

    #[test]
    fn long_history_respects_the_budget() {
        let values: Vec<f64> = (0..5000).map(|i| i as f64).collect();
        let series = make_series(&values, Duration::minutes(1));
        let forecast = make_forecast(&series, 3);
        let fused = fuse(&series, &forecast, 200);

        let history: Vec<_> = fused.iter().filter(|p| !p.is_future).collect();
        // Budget plus at most one appended final point.
        assert!(history.len() <= 201);
        // The last historical point is the most recent real observation.
        let last_hist = history.last().expect("non-empty");
        assert!((last_hist.value - 4999.0).abs() < f64::EPSILON);
    }

    #[test]
    fn history_precedes_future_and_order_is_monotone() {
        let values: Vec<f64> = (0..500).map(|i| (i % 7) as f64).collect();
        let series = make_series(&values, Duration::minutes(30));
        let forecast = make_forecast(&series, 144);
        let fused = fuse(&series, &forecast, 200);

        let first_future = fused
            .iter()
            .position(|p| p.is_future)
            .expect("future points present");
        assert!(fused[..first_future].iter().all(|p| !p.is_future));
        assert!(fused[first_future..].iter().all(|p| p.is_future));

        for pair in fused.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn historical_points_have_zero_width_bands() {
        let series = make_series(&[4.0, 5.0, 6.0], Duration::hours(1));
        let forecast = make_forecast(&series, 1);
        let fused = fuse(&series, &forecast, 200);
        for point in fused.iter().filter(|p| !p.is_future) {
            assert!((point.confidence_low - point.value).abs() < f64::EPSILON);
            assert!((point.confidence_high - point.value).abs() < f64::EPSILON);
        }
    }
}
