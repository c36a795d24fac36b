//! Field agent.
//!
//! Polls a set of sensor drivers on a fixed interval and pushes the
//! readings to the hub over HTTP. The agent is deliberately dumb: no
//! buffering, no analysis, no retry queue. If the hub doesn't know the
//! sensor it re-registers and carries on; if the hub pushes back an updated
//! config it persists it and the next cycle runs with the new settings.

pub mod config_store;
pub mod drivers;

use std::collections::BTreeMap;

use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config_store::{AgentConfig, ConfigStore, ConfigStoreError};
pub use drivers::{DriverError, SensorDriver, SimulatedInclinometer};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("hub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] ConfigStoreError),
}

/// Reading document pushed to the hub each cycle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadingPush {
    sensor_id: String,
    timestamp: String,
    metrics: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Hub's ingest acknowledgement. A populated `config` means the hub has a
/// newer configuration for this sensor than the agent is running with.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestAck {
    #[serde(default)]
    config: Option<AgentConfig>,
}

pub struct FieldAgent {
    hub_url: String,
    store: ConfigStore,
    drivers: Vec<Box<dyn SensorDriver>>,
    client: reqwest::Client,
}

impl FieldAgent {
    pub fn new(hub_url: impl Into<String>, store: ConfigStore) -> Self {
        let mut hub_url = hub_url.into();
        while hub_url.ends_with('/') {
            hub_url.pop();
        }
        Self {
            hub_url,
            store,
            drivers: Vec::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn add_driver(&mut self, driver: Box<dyn SensorDriver>) {
        self.drivers.push(driver);
    }

    /// Run the poll loop until the process is stopped. Individual cycle
    /// failures are logged and the loop keeps going.
    pub async fn run(&mut self) -> Result<(), AgentError> {
        tracing::info!(hub = %self.hub_url, "Field agent starting");
        loop {
            if let Err(error) = self.run_cycle().await {
                tracing::warn!(error = %error, "Agent cycle failed");
            }
            let interval_ms = self.store.current().interval_ms;
            tokio::time::sleep(std::time::Duration::from_millis(interval_ms)).await;
        }
    }

    async fn run_cycle(&mut self) -> Result<(), AgentError> {
        if let Err(error) = self.store.reload_if_changed() {
            tracing::warn!(error = %error, "Agent config reload failed, keeping last good");
        }

        let mut metrics: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for driver in &mut self.drivers {
            match driver.read().await {
                Ok(readings) => {
                    metrics
                        .entry(driver.group().to_string())
                        .or_default()
                        .extend(readings);
                }
                Err(error) => {
                    tracing::warn!(
                        driver = driver.identifier(),
                        error = %error,
                        "Driver read failed, skipping this cycle"
                    );
                }
            }
        }

        if metrics.is_empty() {
            tracing::debug!("No driver produced readings, nothing to push");
            return Ok(());
        }

        let config = self.store.current();
        let push = ReadingPush {
            sensor_id: config.sensor_id.clone(),
            timestamp: Utc::now().to_rfc3339(),
            metrics,
        };

        let response = self
            .client
            .post(format!("{}/ingest", self.hub_url))
            .json(&push)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(sensor_id = %push.sensor_id, "Hub doesn't know this sensor, re-registering");
            self.register().await?;
            return Ok(());
        }

        let response = response.error_for_status()?;
        let ack: IngestAck = response.json().await.unwrap_or(IngestAck { config: None });
        if let Some(pushed) = ack.config {
            tracing::info!(sensor_id = %pushed.sensor_id, "Hub pushed updated config, persisting");
            self.store.save(pushed)?;
        }

        Ok(())
    }

    async fn register(&self) -> Result<(), AgentError> {
        let config = self.store.current();
        self.client
            .post(format!("{}/ingest/sensor", self.hub_url))
            .json(config.as_ref())
            .send()
            .await?
            .error_for_status()?;
        tracing::info!(sensor_id = %config.sensor_id, "Sensor registered with hub");
        Ok(())
    }
}
