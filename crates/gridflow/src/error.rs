//! The facade's aggregate error type.

use std::path::PathBuf;

use gridflow_core::CoreError;
use gridflow_engine::EngineError;
use gridflow_launch::LaunchError;
use thiserror::Error;

/// Result type alias for framework operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Anything that can go wrong between parsing the command line and
/// finishing a run.
#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("cannot read configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// `--grid-engine` was requested through `entry`; submission needs
    /// a scheduler wrapper passed to `entry_with`.
    #[error("grid-engine dispatch needs a submitter; call entry_with")]
    NoSubmitter,

    #[error("{failed} tasks failed and {blocked} never became runnable")]
    PoolFailed { failed: usize, blocked: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// Whether this failure is a job misconfiguration, which the
    /// grid-engine return-code mapping may turn into a restart
    /// request.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            Self::Core(CoreError::Misconfigured(_))
                | Self::Engine(EngineError::Core(CoreError::Misconfigured(_)))
                | Self::Launch(LaunchError::Core(CoreError::Misconfigured(_)))
                | Self::Launch(LaunchError::Engine(EngineError::Core(
                    CoreError::Misconfigured(_)
                )))
        )
    }
}
