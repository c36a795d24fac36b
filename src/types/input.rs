//! Request payload types, mirroring the hub's ingestion wire format.
//!
//! Timestamps arrive as strings and are parsed by the normalizer so that a
//! malformed timestamp skips the affected sensor batch instead of failing
//! deserialization of the whole request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optional per-metric bounds. An absent bound means no check on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// category → metric → bounds. Immutable for the lifetime of a request.
pub type MetricsConfig = BTreeMap<String, BTreeMap<String, MetricConfig>>;

/// Identity and metric configuration for one sensor unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorConfig {
    pub sensor_id: String,
    #[serde(default)]
    pub metrics_config: MetricsConfig,
}

/// One raw reading: a timestamp plus category → metric → value.
///
/// Values are `Option` because field agents report `null` for metrics a
/// driver failed to sample; nulls are dropped during normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}

/// Everything the engine needs for one machine: who it is, what bounds
/// apply, and the raw history supplied with this request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineData {
    pub config: SensorConfig,
    #[serde(default)]
    pub readings: Vec<Reading>,
}
