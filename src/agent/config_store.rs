//! Agent configuration with hot reload.
//!
//! The agent's config file can change underneath it in two ways: an operator
//! edits it on disk, or the hub pushes a new copy in an ingest response. The
//! store keeps the live snapshot behind an [`ArcSwap`] so the poll loop
//! reads lock-free, and checks the file's mtime each cycle to pick up edits.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::MetricsConfig;

#[derive(Error, Debug)]
pub enum ConfigStoreError {
    #[error("failed to read agent config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write agent config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid agent config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn default_interval_ms() -> u64 {
    2000
}

/// On-disk agent configuration, shared shape with what the hub pushes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub sensor_id: String,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub metrics_config: MetricsConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            sensor_id: String::new(),
            interval_ms: default_interval_ms(),
            metrics_config: BTreeMap::new(),
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
    current: ArcSwap<AgentConfig>,
    last_modified: std::sync::Mutex<Option<SystemTime>>,
}

impl ConfigStore {
    /// Load the config file at `path`. A missing file yields the defaults;
    /// a present but malformed file is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigStoreError> {
        let path = path.into();
        let (config, modified) = match read_config(&path)? {
            Some(loaded) => loaded,
            None => {
                tracing::info!(path = %path.display(), "Agent config missing, using defaults");
                (AgentConfig::default(), None)
            }
        };

        Ok(Self {
            path,
            current: ArcSwap::from_pointee(config),
            last_modified: std::sync::Mutex::new(modified),
        })
    }

    /// Lock-free snapshot of the live config.
    pub fn current(&self) -> Arc<AgentConfig> {
        self.current.load_full()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file if its mtime moved since the last load. Returns
    /// whether a reload happened.
    pub fn reload_if_changed(&self) -> Result<bool, ConfigStoreError> {
        let Some((config, modified)) = read_config(&self.path)? else {
            return Ok(false);
        };

        let mut guard = self
            .last_modified
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *guard == modified {
            return Ok(false);
        }

        tracing::info!(path = %self.path.display(), "Agent config changed on disk, reloading");
        *guard = modified;
        drop(guard);
        self.current.store(Arc::new(config));
        Ok(true)
    }

    /// Replace the live config and persist it, used when the hub pushes a
    /// new copy back in an ingest response.
    pub fn save(&self, config: AgentConfig) -> Result<(), ConfigStoreError> {
        let serialized =
            serde_json::to_string_pretty(&config).map_err(|source| ConfigStoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        std::fs::write(&self.path, serialized).map_err(|source| ConfigStoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        let mut guard = self
            .last_modified
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok();
        drop(guard);

        self.current.store(Arc::new(config));
        Ok(())
    }
}

#[allow(clippy::type_complexity)]
fn read_config(path: &Path) -> Result<Option<(AgentConfig, Option<SystemTime>)>, ConfigStoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigStoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config: AgentConfig =
        serde_json::from_str(&raw).map_err(|source| ConfigStoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
    Ok(Some((config, modified)))
}
