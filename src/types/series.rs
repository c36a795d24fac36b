//! Time-ordered metric series, the unit every analysis stage operates on.

use chrono::{DateTime, Duration, Utc};

/// One observation: a UTC timestamp paired with a finite value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Ordered sequence of observations for a single (sensor, category, metric).
///
/// Invariants, enforced by the normalizer:
/// - timestamps are non-decreasing
/// - every value is finite
/// - at least 2 points
#[derive(Debug, Clone)]
pub struct MetricSeries {
    pub sensor_id: String,
    pub category: String,
    pub metric: String,
    pub points: Vec<SeriesPoint>,
}

impl MetricSeries {
    /// Raw values in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Timestamp of the last real observation.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.last().map(|p| p.timestamp)
    }

    /// Total observed duration, first point to last.
    pub fn duration(&self) -> Duration {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => Duration::zero(),
        }
    }

    /// Largest observed value, used as the long-horizon clamp reference.
    pub fn historical_max(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_series(values: &[f64]) -> MetricSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        MetricSeries {
            sensor_id: "S-1".to_string(),
            category: "mechanical".to_string(),
            metric: "vibration".to_string(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, &v)| SeriesPoint {
                    timestamp: start + Duration::hours(i as i64),
                    value: v,
                })
                .collect(),
        }
    }

    #[test]
    fn duration_spans_first_to_last() {
        let series = make_series(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.duration(), Duration::hours(3));
    }

    #[test]
    fn historical_max_ignores_order() {
        let series = make_series(&[5.0, 9.0, 2.0]);
        assert!((series.historical_max() - 9.0).abs() < f64::EPSILON);
    }
}
