//! Recommendation Generator
//!
//! Pure mapping from the analysis outcome to an advisory string. Priority:
//! critical > imminent RUL > warning > high volatility > directional trend >
//! nominal. The strategy only contributes a display prefix.

use crate::config::EngineConfig;
use crate::types::{HealthStatus, StrategyKind, TrendDirection};

/// Build the advisory line for one metric.
pub fn generate(
    status: HealthStatus,
    trend: TrendDirection,
    rul_hours: Option<f64>,
    strategy: StrategyKind,
    volatility: f64,
    config: &EngineConfig,
) -> String {
    let body = if status == HealthStatus::Critical {
        "Imminent stoppage risk: value out of range, immediate inspection required."
    } else if rul_hours.is_some_and(|rul| rul < config.horizon_hours) {
        "Projected threshold breach within 24h: schedule preventive maintenance."
    } else if status == HealthStatus::Warning {
        "Out-of-range values expected or anomaly history elevated: monitor closely."
    } else if volatility > config.volatility_warning_cv {
        "High signal volatility: verify mounting, load stability and sensor coupling."
    } else {
        match trend {
            TrendDirection::Increasing => "Upward trend: verify load conditions.",
            TrendDirection::Decreasing => "Downward trend: verify supply and wear.",
            TrendDirection::Stable => "Normal operation.",
        }
    };

    format!("[{}] {}", strategy.label(), body)
}
