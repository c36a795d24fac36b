//! Report types returned to the serving layer: per-metric analysis leaves,
//! per-sensor trees, and the chart-ready fused series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Health classification for a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Warning,
    Critical,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Direction of the projected 24 h change relative to the anchor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increasing => write!(f, "increasing"),
            Self::Decreasing => write!(f, "decreasing"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

/// Which forecasting strategy produced the future points for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    ShortHorizon,
    LongHorizon,
}

impl StrategyKind {
    /// Display prefix used by the recommendation generator.
    pub fn label(self) -> &'static str {
        match self {
            Self::ShortHorizon => "linear",
            Self::LongHorizon => "seasonal",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortHorizon => write!(f, "short_horizon"),
            Self::LongHorizon => write!(f, "long_horizon"),
        }
    }
}

/// One chart point, historical or forecast.
///
/// Invariant: `confidence_low <= value <= confidence_high`. Historical
/// points carry zero-width bands (`value == low == high`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub confidence_low: f64,
    pub confidence_high: f64,
    pub is_future: bool,
}

/// Full analysis for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReport {
    pub status: HealthStatus,
    pub current_value: f64,
    pub predicted_value_24h: f64,
    pub trend: TrendDirection,
    /// Projected 24 h change (forecast minus anchor).
    pub slope: f64,
    /// Coefficient of variation of the raw history.
    pub volatility: f64,
    /// Raw-history points more than 3σ from the raw mean.
    pub anomaly_count: usize,
    /// Hours until the forecast first breaches a bound; `None` when no
    /// breach falls inside the forecast horizon.
    pub rul_hours: Option<f64>,
    pub strategy: StrategyKind,
    pub recommendation: String,
}

/// Chart series for one metric within a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricChart {
    pub metric: String,
    pub data: Vec<ForecastPoint>,
}

/// Per-sensor results: a report tree mirroring the config shape plus the
/// parallel chart-data tree. Absent leaves mean "insufficient or
/// unanalyzable data", never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReport {
    pub sensor_id: String,
    pub summary: BTreeMap<String, BTreeMap<String, MetricReport>>,
    pub chart_data: BTreeMap<String, Vec<MetricChart>>,
}

/// Response envelope: generation timestamp plus one report per sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub timestamp: DateTime<Utc>,
    pub report: Vec<SensorReport>,
}
