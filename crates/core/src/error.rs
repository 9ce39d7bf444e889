//! Error types for gridflow.

use std::path::PathBuf;

use thiserror::Error;

use crate::identifier::Identifier;

/// Result type alias for gridflow operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for the core job model.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A job declared resources or capabilities it cannot honor.
    /// Detected before execution; maps to a restartable exit code
    /// under a grid engine.
    #[error("job is misconfigured: {0}")]
    Misconfigured(String),

    #[error("job '{0}' not found")]
    JobNotFound(Identifier),

    #[error("job '{identifier}' failed: {message}")]
    JobFailed {
        identifier: Identifier,
        message: String,
    },

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while checking, fabricating, or removing an entity.
///
/// These are hard failures (the artifact could not be examined at all),
/// distinct from an artifact that was examined and found invalid.
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("cannot access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}
