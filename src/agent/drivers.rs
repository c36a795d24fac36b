//! Sensor drivers.
//!
//! A driver owns one physical (or simulated) sensing device and reports a
//! flat set of named measurements per poll. The agent groups each driver's
//! measurements under its category in the outgoing reading document.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("device read failed: {0}")]
    Device(String),

    #[error("driver not ready: {0}")]
    NotReady(String),
}

/// Contract for one sensing device.
#[async_trait]
pub trait SensorDriver: Send + Sync {
    /// Stable name for this driver, unique within the agent.
    fn identifier(&self) -> &str;

    /// Category the measurements are grouped under (e.g. "orientation").
    fn group(&self) -> &str;

    /// Poll the device once. Metric names are stable across polls; a metric
    /// the device could not read this cycle is simply absent from the map.
    async fn read(&mut self) -> Result<BTreeMap<String, f64>, DriverError>;
}

/// Simulated 3-axis inclinometer for bench runs without hardware. Each axis
/// drifts slowly around its bias with Gaussian measurement noise.
pub struct SimulatedInclinometer {
    identifier: String,
    axes: [(String, f64); 3],
    noise: Normal<f64>,
}

impl SimulatedInclinometer {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            axes: [
                ("roll".to_string(), 0.0),
                ("pitch".to_string(), 0.0),
                ("yaw".to_string(), 180.0),
            ],
            // 0.15 degrees of RMS noise, in line with a mid-grade MEMS part.
            noise: Normal::new(0.0, 0.15).expect("valid standard deviation"),
        }
    }
}

#[async_trait]
impl SensorDriver for SimulatedInclinometer {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn group(&self) -> &str {
        "orientation"
    }

    async fn read(&mut self) -> Result<BTreeMap<String, f64>, DriverError> {
        let mut rng = rand::thread_rng();
        let mut readings = BTreeMap::new();
        for (axis, bias) in &mut self.axes {
            // Slow random-walk drift plus per-sample noise.
            *bias += rng.gen_range(-0.01..=0.01);
            let sample = *bias + self.noise.sample(&mut rng);
            readings.insert(axis.clone(), sample);
        }
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_inclinometer_reports_all_axes() {
        let mut driver = SimulatedInclinometer::new("incl-0");
        let readings = driver.read().await.expect("read");
        assert_eq!(driver.group(), "orientation");
        assert_eq!(readings.len(), 3);
        for axis in ["roll", "pitch", "yaw"] {
            assert!(readings[axis].is_finite(), "{axis} should be finite");
        }
    }

    #[tokio::test]
    async fn consecutive_reads_stay_near_bias() {
        let mut driver = SimulatedInclinometer::new("incl-0");
        for _ in 0..50 {
            let readings = driver.read().await.expect("read");
            assert!(readings["roll"].abs() < 5.0);
            assert!((readings["yaw"] - 180.0).abs() < 5.0);
        }
    }
}
