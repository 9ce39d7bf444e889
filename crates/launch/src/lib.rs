//! Gridflow Launch - Process and scheduler backends for gridflow.
//!
//! Child-process argument rewriting, the memory-bounded local pool,
//! the abstract grid submitter with hold-aware submission, and the
//! queue monitor. The graph decisions themselves live in
//! `gridflow-engine`; this crate is what touches the operating system.

mod args;
mod error;
mod monitor;
mod pool;
mod runner;
mod submit;

pub use args::{StripFlags, setup_args_for_job};
pub use error::{LaunchError, Result};
pub use monitor::{MonitorOptions, MonitorState, check_complete};
pub use pool::{
    LaunchDescription, PoolOptions, PoolReport, RunNext, RunnableSource, graph_do,
};
pub use runner::{ProcessOutput, ProcessRunner, find_executable, resolve_program};
pub use submit::{
    GridJobId, JobRequest, QueueEntry, QueueState, Submitter, launch_jobs, sanitize_job_name,
};
