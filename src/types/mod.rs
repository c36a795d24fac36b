//! Core types: request payloads, metric series, and report trees.

mod input;
mod report;
mod series;

pub use input::{MachineData, MetricConfig, MetricsConfig, Reading, SensorConfig};
pub use report::{
    AnalysisResponse, ForecastPoint, HealthStatus, MetricChart, MetricReport, SensorReport,
    StrategyKind, TrendDirection,
};
pub use series::{MetricSeries, SeriesPoint};
