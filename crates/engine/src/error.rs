//! Error types for the graph engine.

use gridflow_core::{CoreError, CycleError, Identifier};
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors from the pure graph computations.
///
/// The engine fails immediately on malformed input; there is no
/// partial recovery, so nothing launches after one of these.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// A selected identifier is absent from the job graph.
    #[error("job '{0}' is not in the job graph")]
    UnknownJob(Identifier),

    #[error(transparent)]
    Core(#[from] CoreError),
}
