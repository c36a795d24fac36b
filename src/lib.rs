//! Presage: Predictive Maintenance Engine
//!
//! Turns timestamped sensor readings into per-metric maintenance reports:
//! health status, 24-hour forecast, trend, anomaly density, remaining
//! useful life, and a fused chart series ready for plotting.
//!
//! ## Architecture
//!
//! - **Engine**: Stateless analysis pipeline (normalize → anchor → forecast
//!   → risk/RUL → chart → recommendation)
//! - **Strategies**: Short-horizon damped linear and long-horizon seasonal
//!   forecasters, selected by history span
//! - **Agent**: Field-side poll loop that pushes driver readings to a hub

pub mod agent;
pub mod config;
pub mod engine;
pub mod types;

// Re-export engine configuration
pub use config::{ConfigError, EngineConfig};

// Re-export the engine entry point
pub use engine::{AnalysisEngine, EngineError};

// Re-export commonly used types
pub use types::{
    AnalysisResponse, ForecastPoint, HealthStatus, MachineData, MetricChart, MetricConfig,
    MetricReport, MetricSeries, MetricsConfig, Reading, SensorConfig, SensorReport, SeriesPoint,
    StrategyKind, TrendDirection,
};

// Re-export agent components
pub use agent::{AgentConfig, ConfigStore, FieldAgent, SensorDriver};
