//! Analysis Engine
//!
//! ## Per-metric pipeline
//!
//! ```text
//! STAGE 1: Normalizer        (nested readings → sorted per-metric series)
//! STAGE 2: Anchor Estimator  (EWMA "current value")
//! STAGE 3: Strategy Selector (short-horizon | long-horizon, with fallback)
//! STAGE 4: Risk Classifier + RUL Estimator
//! STAGE 5: Chart Fuser       (downsampled history + future points)
//! STAGE 6: Recommendation Generator
//! ```
//!
//! Every request is a stateless unit: nothing is shared across metrics,
//! sensors, or requests, and nothing is cached between calls. Metrics within
//! one sensor are independent and evaluated in parallel; a failing metric is
//! logged and omitted without touching its siblings.

pub mod anchor;
pub mod chart;
pub mod normalizer;
pub mod recommend;
pub mod risk;
pub mod rul;
pub mod stats;
pub mod strategy;

use std::collections::BTreeMap;

use chrono::Utc;
use rayon::prelude::*;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::types::{
    AnalysisResponse, ForecastPoint, MachineData, MetricChart, MetricConfig, MetricReport,
    MetricSeries, SensorReport, TrendDirection,
};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("anchor value is not finite for {category}/{metric}")]
    NonFiniteAnchor { category: String, metric: String },

    #[error("forecast produced no points for {category}/{metric}")]
    EmptyForecast { category: String, metric: String },
}

/// Stateless per-request analysis engine. Cheap to construct; holds only
/// the tuning constants.
pub struct AnalysisEngine {
    config: EngineConfig,
}

impl AnalysisEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a batch of machines. Always best-effort partial: sensors and
    /// metrics that cannot be analyzed are absent from the response, never
    /// an error.
    pub fn analyze(&self, machines: &[MachineData]) -> AnalysisResponse {
        let report = machines
            .iter()
            .filter_map(|machine| self.analyze_machine(machine))
            .collect();

        AnalysisResponse {
            timestamp: Utc::now(),
            report,
        }
    }

    fn analyze_machine(&self, machine: &MachineData) -> Option<SensorReport> {
        let series_list = normalizer::normalize_machine(machine)?;

        // Metrics are mutually independent; forecast fitting dominates the
        // per-metric cost, so fan out across them.
        let analyzed: Vec<(MetricSeries, MetricReport, Vec<ForecastPoint>)> = series_list
            .into_par_iter()
            .filter_map(|series| {
                let bounds = machine
                    .config
                    .metrics_config
                    .get(&series.category)
                    .and_then(|metrics| metrics.get(&series.metric))
                    .copied()
                    .unwrap_or_default();

                match self.analyze_metric(&series, &bounds) {
                    Ok((report, chart)) => Some((series, report, chart)),
                    Err(error) => {
                        tracing::warn!(
                            sensor_id = %series.sensor_id,
                            category = %series.category,
                            metric = %series.metric,
                            error = %error,
                            "Metric analysis failed, omitting metric"
                        );
                        None
                    }
                }
            })
            .collect();

        let mut summary: BTreeMap<String, BTreeMap<String, MetricReport>> = BTreeMap::new();
        let mut chart_data: BTreeMap<String, Vec<MetricChart>> = BTreeMap::new();

        for (series, report, chart) in analyzed {
            summary
                .entry(series.category.clone())
                .or_default()
                .insert(series.metric.clone(), report);
            chart_data.entry(series.category).or_default().push(MetricChart {
                metric: series.metric,
                data: chart,
            });
        }

        Some(SensorReport {
            sensor_id: machine.config.sensor_id.clone(),
            summary,
            chart_data,
        })
    }

    /// Run the full pipeline for one metric series.
    pub fn analyze_metric(
        &self,
        series: &MetricSeries,
        bounds: &MetricConfig,
    ) -> Result<(MetricReport, Vec<ForecastPoint>), EngineError> {
        let config = &self.config;
        let values = series.values();

        let anchor = anchor::smoothed_anchor(&values, config.ewma_span);
        if !anchor.is_finite() {
            return Err(EngineError::NonFiniteAnchor {
                category: series.category.clone(),
                metric: series.metric.clone(),
            });
        }

        let volatility = stats::volatility(&values);
        let anomaly_count = stats::anomaly_count(&values, config.anomaly_sigma);

        let forecast = strategy::select_forecast(series, anchor, config);
        if forecast.points.is_empty() {
            return Err(EngineError::EmptyForecast {
                category: series.category.clone(),
                metric: series.metric.clone(),
            });
        }

        let predicted_24h = forecast.predicted_24h();
        let slope = predicted_24h - anchor;

        let trend = if slope.abs() <= config.trend_band_ratio * anchor.abs() {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        let status = risk::classify(
            anchor,
            predicted_24h,
            bounds,
            anomaly_count,
            config.anomaly_escalation_count,
        );
        let rul_hours = rul::estimate(&forecast, bounds, config.min_rul_hours);
        let recommendation = recommend::generate(
            status,
            trend,
            rul_hours,
            forecast.strategy,
            volatility,
            config,
        );
        let chart = chart::fuse(series, &forecast, config.chart_budget);

        let report = MetricReport {
            status,
            current_value: anchor,
            predicted_value_24h: predicted_24h,
            trend,
            slope,
            volatility,
            anomaly_count,
            rul_hours,
            strategy: forecast.strategy,
            recommendation,
        };

        Ok((report, chart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HealthStatus, Reading, SensorConfig, StrategyKind};
    use std::collections::BTreeMap;

    fn make_machine(sensor_id: &str, values: &[f64], max: Option<f64>) -> MachineData {
        let mut metrics = BTreeMap::new();
        metrics.insert("vibration".to_string(), MetricConfig { min: None, max });
        let mut config_tree = BTreeMap::new();
        config_tree.insert("mechanical".to_string(), metrics);

        let readings = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut inner = BTreeMap::new();
                inner.insert("vibration".to_string(), Some(v));
                let mut m = BTreeMap::new();
                m.insert("mechanical".to_string(), inner);
                Reading {
                    timestamp: format!("2024-03-01T{:02}:{:02}:00Z", i / 60, i % 60),
                    metrics: m,
                }
            })
            .collect();

        MachineData {
            config: SensorConfig {
                sensor_id: sensor_id.to_string(),
                metrics_config: config_tree,
            },
            readings,
        }
    }

    #[test]
    fn report_tree_mirrors_config_shape() {
        let engine = AnalysisEngine::new(EngineConfig::default());
        let machine = make_machine("S-1", &[1.0, 2.0, 3.0, 4.0, 5.0], Some(100.0));

        let response = engine.analyze(&[machine]);
        assert_eq!(response.report.len(), 1);

        let sensor = &response.report[0];
        assert_eq!(sensor.sensor_id, "S-1");
        assert!(sensor.summary["mechanical"].contains_key("vibration"));
        assert_eq!(sensor.chart_data["mechanical"].len(), 1);
        assert_eq!(sensor.chart_data["mechanical"][0].metric, "vibration");
    }

    #[test]
    fn empty_batch_yields_empty_report() {
        let engine = AnalysisEngine::new(EngineConfig::default());
        let machine = MachineData {
            config: SensorConfig::default(),
            readings: Vec::new(),
        };
        let response = engine.analyze(&[machine]);
        assert!(response.report.is_empty());
    }

    #[test]
    fn anchor_breach_reports_critical() {
        let engine = AnalysisEngine::new(EngineConfig::default());
        let machine = make_machine("S-1", &[150.0, 151.0, 152.0, 153.0], Some(100.0));

        let response = engine.analyze(&[machine]);
        let report = &response.report[0].summary["mechanical"]["vibration"];
        assert_eq!(report.status, HealthStatus::Critical);
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let engine = AnalysisEngine::new(EngineConfig::default());
        let values: Vec<f64> = (0..50).map(|i| 20.0 + (i as f64 * 0.37).sin()).collect();
        let machine = make_machine("S-1", &values, Some(100.0));

        let first = engine.analyze(std::slice::from_ref(&machine));
        let second = engine.analyze(std::slice::from_ref(&machine));

        let a = &first.report[0].summary["mechanical"]["vibration"];
        let b = &second.report[0].summary["mechanical"]["vibration"];
        assert_eq!(a.status, b.status);
        assert_eq!(a.trend, b.trend);
        assert_eq!(a.strategy, b.strategy);
        assert!((a.current_value - b.current_value).abs() < f64::EPSILON);
        assert!((a.predicted_value_24h - b.predicted_value_24h).abs() < f64::EPSILON);
    }

    #[test]
    fn unconfigured_metric_in_readings_is_ignored() {
        // Readings carry an extra metric the config tree never names.
        let mut machine = make_machine("S-1", &[1.0, 2.0, 3.0], Some(100.0));
        for reading in &mut machine.readings {
            reading
                .metrics
                .get_mut("mechanical")
                .expect("category exists")
                .insert("unlisted".to_string(), Some(9.0));
        }

        let engine = AnalysisEngine::new(EngineConfig::default());
        let response = engine.analyze(&[machine]);
        let sensor = &response.report[0];
        assert!(!sensor.summary["mechanical"].contains_key("unlisted"));
    }

    #[test]
    fn short_history_uses_short_horizon_end_to_end() {
        let engine = AnalysisEngine::new(EngineConfig::default());
        // Minute-spaced readings: 4 minutes of history.
        let machine = make_machine("S-1", &[10.0, 10.5, 11.0, 11.5, 12.0], Some(100.0));

        let response = engine.analyze(&[machine]);
        let report = &response.report[0].summary["mechanical"]["vibration"];
        assert_eq!(report.strategy, StrategyKind::ShortHorizon);
    }
}
