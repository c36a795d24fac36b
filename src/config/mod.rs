//! Engine Configuration
//!
//! Tunable forecaster constants loaded from TOML, replacing hardcoded
//! magic numbers with operator-tunable values. The seasonality and trend
//! flexibility knobs are empirically tuned, not proven-optimal — which is
//! exactly why they live here instead of in the strategy code.
//!
//! ## Loading Order
//!
//! 1. Explicit path (`--config` / caller-supplied)
//! 2. `PRESAGE_CONFIG` environment variable
//! 3. Built-in defaults
//!
//! The config is passed by reference into [`crate::engine::AnalysisEngine`];
//! there is no global state.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// All engine tuning constants. Every field has a sensible default, so a
/// partial TOML file only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// EWMA span for the anchor estimator.
    pub ewma_span: usize,
    /// Forecast horizon in hours.
    pub horizon_hours: f64,
    /// Forecast resolution in minutes.
    pub step_minutes: i64,
    /// Visual point budget for downsampled history.
    pub chart_budget: usize,
    /// Minimum observed history (hours) before the long-horizon strategy
    /// is attempted. Below this, seasonal fitting is unstable.
    pub long_horizon_min_history_hours: f64,
    /// Short-horizon slope clamp, as a fraction of |anchor| per hour.
    pub slope_clamp_ratio: f64,
    /// Synthetic noise floor for flat series, as a fraction of |anchor|.
    pub noise_floor_ratio: f64,
    /// Sigma multiplier for historical anomaly detection.
    pub anomaly_sigma: f64,
    /// Anomaly count above which "ok" escalates to "warning".
    pub anomaly_escalation_count: usize,
    /// Number of daily-cycle Fourier harmonics in the long-horizon fit.
    pub seasonal_harmonics: usize,
    /// Seasonality weight: ridge penalty on seasonal coefficients is
    /// `1 / seasonality_weight`, so larger values let the daily cycle
    /// dominate more.
    pub seasonality_weight: f64,
    /// Recency half-life (hours) for the long-horizon trend fit. Smaller
    /// values make the model more responsive to recent changes.
    pub trend_half_life_hours: f64,
    /// Long-horizon safety clamp ceiling, as a multiple of historical max.
    pub clamp_ceiling_factor: f64,
    /// Clamp ceiling used when the historical max is non-positive.
    pub clamp_fallback_ceiling: f64,
    /// Floor for reported RUL, in hours.
    pub min_rul_hours: f64,
    /// Coefficient-of-variation threshold for the volatility advisory.
    pub volatility_warning_cv: f64,
    /// Trend dead-band: |24 h change| below this fraction of |anchor|
    /// classifies as stable.
    pub trend_band_ratio: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ewma_span: 5,
            horizon_hours: 24.0,
            step_minutes: 10,
            chart_budget: 200,
            long_horizon_min_history_hours: 6.0,
            slope_clamp_ratio: 0.10,
            noise_floor_ratio: 0.01,
            anomaly_sigma: 3.0,
            anomaly_escalation_count: 5,
            seasonal_harmonics: 3,
            seasonality_weight: 10.0,
            trend_half_life_hours: 12.0,
            clamp_ceiling_factor: 2.0,
            clamp_fallback_ceiling: 1000.0,
            min_rul_hours: 0.1,
            volatility_warning_cv: 0.15,
            trend_band_ratio: 0.02,
        }
    }
}

impl EngineConfig {
    /// Number of future forecast steps (horizon at native resolution).
    pub fn forecast_steps(&self) -> usize {
        ((self.horizon_hours * 60.0) / self.step_minutes as f64).round() as usize
    }

    /// Load from an explicit path, the `PRESAGE_CONFIG` env var, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        if let Ok(env_path) = std::env::var("PRESAGE_CONFIG") {
            return Self::from_file(Path::new(&env_path));
        }
        tracing::debug!("No engine config supplied, using built-in defaults");
        Ok(Self::default())
    }

    /// Parse a TOML config file. Missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        tracing::info!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }
}
