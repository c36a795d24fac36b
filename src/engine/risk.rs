//! Risk Classifier
//!
//! Derives ok/warning/critical from the smoothed anchor, the 24 h forecast,
//! and historical anomaly density. Threshold checks never look at the raw
//! last sample — that is the anchor estimator's whole reason to exist.

use crate::types::{HealthStatus, MetricConfig};

/// Does `value` sit outside either configured bound? An absent bound means
/// no check on that side.
pub fn breaches(value: f64, bounds: &MetricConfig) -> bool {
    bounds.max.is_some_and(|max| value > max) || bounds.min.is_some_and(|min| value < min)
}

/// Classify a metric.
///
/// 1. critical — the anchor currently breaches a bound.
/// 2. warning — the 24 h-ahead forecast would breach a bound.
/// 3. warning — anomaly density exceeds the escalation count, even with the
///    anchor comfortably inside bounds.
/// 4. ok — otherwise.
pub fn classify(
    anchor: f64,
    predicted_24h: f64,
    bounds: &MetricConfig,
    anomaly_count: usize,
    escalation_count: usize,
) -> HealthStatus {
    if breaches(anchor, bounds) {
        return HealthStatus::Critical;
    }
    if breaches(predicted_24h, bounds) {
        return HealthStatus::Warning;
    }
    if anomaly_count > escalation_count {
        return HealthStatus::Warning;
    }
    HealthStatus::Ok
}
