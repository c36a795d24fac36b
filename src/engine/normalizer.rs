//! Data Normalizer
//!
//! Reshapes a machine's nested category → metric readings into flat,
//! time-ordered series. Null and non-finite values are dropped, points are
//! sorted chronologically, and a metric needs at least 2 valid points to
//! produce a series. A reading batch with an unparseable timestamp skips
//! the whole sensor — logged, never fatal.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::types::{MachineData, MetricSeries, SeriesPoint};

/// Minimum valid points for a metric to be analyzable.
pub const MIN_SERIES_POINTS: usize = 2;

/// Parse an ISO-8601 timestamp. Naive timestamps are assumed UTC, matching
/// what field agents emit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Flatten one machine's readings into per-metric series, one for every
/// metric named in its config tree.
///
/// Returns `None` when the batch is unusable as a whole (no readings, or a
/// timestamp that fails to parse). Individual metrics with fewer than
/// [`MIN_SERIES_POINTS`] valid values are silently excluded — the caller
/// treats a missing series as a non-finding.
pub fn normalize_machine(machine: &MachineData) -> Option<Vec<MetricSeries>> {
    let sensor_id = &machine.config.sensor_id;

    if machine.readings.is_empty() {
        tracing::debug!(sensor_id = %sensor_id, "No readings supplied, skipping sensor");
        return None;
    }

    // Parse every timestamp up front: one bad timestamp invalidates the
    // batch's ordering guarantees for the whole sensor.
    let mut stamped = Vec::with_capacity(machine.readings.len());
    for reading in &machine.readings {
        match parse_timestamp(&reading.timestamp) {
            Some(ts) => stamped.push((ts, reading)),
            None => {
                tracing::warn!(
                    sensor_id = %sensor_id,
                    timestamp = %reading.timestamp,
                    "Unparseable timestamp, skipping sensor batch"
                );
                return None;
            }
        }
    }

    let mut series_list = Vec::new();

    for (category, metrics) in &machine.config.metrics_config {
        for metric in metrics.keys() {
            let mut points: Vec<SeriesPoint> = stamped
                .iter()
                .filter_map(|(ts, reading)| {
                    let value = reading
                        .metrics
                        .get(category)
                        .and_then(|m| m.get(metric))
                        .copied()
                        .flatten()?;
                    value.is_finite().then_some(SeriesPoint {
                        timestamp: *ts,
                        value,
                    })
                })
                .collect();

            if points.len() < MIN_SERIES_POINTS {
                tracing::debug!(
                    sensor_id = %sensor_id,
                    category = %category,
                    metric = %metric,
                    valid_points = points.len(),
                    "Insufficient valid points, excluding metric"
                );
                continue;
            }

            points.sort_by_key(|p| p.timestamp);

            series_list.push(MetricSeries {
                sensor_id: sensor_id.clone(),
                category: category.clone(),
                metric: metric.clone(),
                points,
            });
        }
    }

    Some(series_list)
}
