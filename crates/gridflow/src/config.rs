//! Framework configuration.
//!
//! One explicit struct, loaded at process start and passed by
//! reference to whatever needs it. None of the graph engine reads it;
//! it feeds grid submission and queue monitoring.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use gridflow_launch::MonitorOptions;

use crate::error::{GridError, Result};

/// Settings for the grid-engine side of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Accounting project used when `--project` is not given.
    pub project: String,

    /// Queues submissions may land on, shortest-runtime first.
    pub queues: Vec<String>,

    /// Seconds a submitted job may take to first appear in the queue.
    pub initial_timeout_seconds: u64,

    /// Seconds a job may sit in the queue before monitoring gives up.
    pub engine_timeout_seconds: u64,

    /// Seconds between queue polls.
    pub poll_interval_seconds: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            project: "proj_forecasting".to_string(),
            queues: vec!["all.q".to_string(), "long.q".to_string()],
            initial_timeout_seconds: 60,
            engine_timeout_seconds: 60 * 60,
            poll_interval_seconds: 15,
        }
    }
}

impl GridConfig {
    /// Loads configuration.
    ///
    /// With an explicit path the file must exist and parse. Without
    /// one, the per-user file is read when present and the defaults
    /// apply otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };
        let content = fs::read_to_string(&path).map_err(|err| GridError::Config {
            path: path.clone(),
            message: err.to_string(),
        })?;
        toml::from_str(&content).map_err(|err| GridError::Config {
            path,
            message: err.to_string(),
        })
    }

    /// Monitor timeouts derived from this configuration.
    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            initial_timeout: Duration::from_secs(self.initial_timeout_seconds),
            run_timeout: Duration::from_secs(self.engine_timeout_seconds),
            poll_interval: Duration::from_secs(self.poll_interval_seconds),
        }
    }
}

/// The per-user configuration file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gridflow").join("config.toml"))
}
