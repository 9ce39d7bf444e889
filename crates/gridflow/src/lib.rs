//! Gridflow - An application framework for job graphs.
//!
//! An application describes its work as a DAG of jobs with declared
//! resources and output entities, then hands control to [`entry`]. The
//! same program can run its graph directly in process, submit it to a
//! grid engine with dependency holds (through a [`Submitter`]), or run
//! it as a memory-bounded pool of local subprocesses, selected by the
//! execution flags.

mod config;
mod entry;
mod error;
mod logging;
mod output;
mod parser;
mod restart;

pub use config::{GridConfig, default_config_path};
pub use entry::{ReturnCode, entry, entry_with};
pub use error::{GridError, Result};
pub use logging::init_logging;
pub use parser::{ExecutionArgs, execution_command};
pub use restart::restart_count;

// The application-facing surface of the underlying crates.
pub use gridflow_core::{
    Application, CoreError, Dag, Dependency, Entity, EntityError, FileEntity, Identifier, Job,
    JobGraph, JobSelection, JsonFile, Resources, Validation,
};
pub use gridflow_engine::{
    EngineError, TaskGraph, TaskId, check_application, execution_ordered, expand_task_arrays,
    find_runnable, job_subset, jobs_not_done,
};
pub use gridflow_launch::{
    GridJobId, JobRequest, LaunchDescription, LaunchError, MonitorOptions, MonitorState,
    PoolOptions, PoolReport, ProcessOutput, ProcessRunner, QueueEntry, QueueState, RunNext,
    RunnableSource, StripFlags, Submitter, check_complete, graph_do, launch_jobs,
    setup_args_for_job,
};
