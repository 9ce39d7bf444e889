//! Gridflow Engine - Graph-execution engine for the gridflow framework.
//!
//! Pure computations over job and task graphs: subset selection,
//! completion propagation, execution ordering, task-array expansion,
//! and runnable-set computation. Nothing here launches a process.

mod error;
mod order;
mod runnable;
mod subset;
mod tasks;
mod validate;

pub use error::{EngineError, Result};
pub use order::execution_ordered;
pub use runnable::find_runnable;
pub use subset::{job_subset, jobs_not_done};
pub use tasks::{TaskGraph, TaskId, expand_task_arrays, task_indices};
pub use validate::check_application;
