//! Error types for process launching and grid submission.

use std::path::PathBuf;
use std::time::Duration;

use gridflow_core::CoreError;
use gridflow_engine::EngineError;
use thiserror::Error;

use crate::monitor::MonitorState;

/// Result type alias for launch operations.
pub type Result<T> = std::result::Result<T, LaunchError>;

/// Errors from subprocess pools and scheduler submission.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("cannot find executable '{0}' on the PATH")]
    ExecutableNotFound(String),

    #[error("failed to spawn {program}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout:?}")]
    CommandTimeout { program: PathBuf, timeout: Duration },

    #[error("pool worker failed: {0}")]
    Pool(String),

    /// The scheduler reports the job deleted or suspended.
    #[error("job '{name}' is dead in the queue")]
    JobDead { name: String },

    /// The monitored job went over a state timeout. The state says
    /// whether it never got scheduled or got stuck running.
    #[error("job exceeded the {state} timeout after {waited:?}")]
    Timeout {
        state: MonitorState,
        waited: Duration,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
