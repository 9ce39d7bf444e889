//! Grid-engine submission behind an abstract submitter.
//!
//! The engine never builds scheduler flags itself; a [`Submitter`]
//! implementation owns the external tool's command line and status
//! format. What lives here is the dependency-aware submission walk.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use gridflow_core::{Application, Identifier, JobSelection, Resources};
use gridflow_engine::{execution_ordered, job_subset};

use crate::args::{StripFlags, setup_args_for_job};
use crate::error::Result;

/// A job's identifier in the external scheduler's queue.
///
/// Task arrays come back with a range suffix such as
/// `10851099.1-30:1`; holds go on the base id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridJobId(String);

impl GridJobId {
    /// Wraps a raw queue identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id without any task-range suffix.
    pub fn base(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    /// The raw id as submitted by the scheduler.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GridJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One submission handed to the external scheduler.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Queue-safe job name (application name, run id, and sanitized
    /// job identifier).
    pub name: String,

    /// The job being submitted.
    pub identifier: Identifier,

    /// Resource needs, including any task count.
    pub resources: Resources,

    /// Base grid ids this job must hold for.
    pub holds: Vec<String>,

    /// Whether the scheduler may rerun the job after a node failure.
    pub restartable: bool,

    /// Accounting project, when one applies.
    pub project: Option<String>,

    /// Child process arguments, already rewritten for this job.
    pub args: Vec<String>,
}

/// State of one queue entry, as far as the monitor cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Pending,
    Running,
    Suspended,
    Deleted,
}

impl QueueState {
    /// States from which the job will never finish.
    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Suspended | Self::Deleted)
    }
}

/// A job as reported by the scheduler's status query.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub name: String,
    pub state: QueueState,
}

/// The external scheduler's narrow interface: submit one job, list
/// the queue. Implementations wrap the real tool's flags and output
/// formats.
pub trait Submitter {
    /// Submits a job, returning its queue identifier.
    fn submit(&mut self, request: &JobRequest) -> Result<GridJobId>;

    /// The current queue, filtered to this user's jobs.
    fn status(&self) -> Result<Vec<QueueEntry>>;
}

/// Makes a job identifier safe for a queue job name: word characters
/// survive, separator runs collapse to a single underscore.
pub fn sanitize_job_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    let mut separated = false;
    for c in raw.chars() {
        if c.is_alphanumeric() || c == '_' {
            name.push(c);
            separated = false;
        } else if (c == ' ' || c == ',' || c == '-') && !separated {
            name.push('_');
            separated = true;
        }
    }
    name
}

/// Submits the selected subgraph to the scheduler with dependency
/// holds.
///
/// Jobs go in in execution order, so every predecessor is queued
/// before its dependents. Each job holds on the grid ids of its
/// completion predecessors; an edge flagged launch-only adds no hold,
/// because submission order alone guarantees the predecessor is
/// already queued.
pub fn launch_jobs(
    app: &dyn Application,
    submitter: &mut dyn Submitter,
    selection: &JobSelection,
    run_id: &str,
    project: Option<&str>,
    restartable: bool,
    strip: &StripFlags,
    arg_list: &[String],
) -> Result<HashMap<Identifier, GridJobId>> {
    let job_graph = job_subset(app, selection)?;
    let job_name = format!("{}{}", app.name(), run_id);

    let mut grid_ids: HashMap<Identifier, GridJobId> = HashMap::new();
    for job_id in execution_ordered(&job_graph)? {
        let args = setup_args_for_job(strip, &app.job_id_to_arguments(&job_id), arg_list);
        let mut holds = Vec::new();
        for (source, dependency) in job_graph.in_edges(&job_id) {
            if !dependency.launch_only {
                holds.push(grid_ids[&source].base().to_string());
            }
        }
        let request = JobRequest {
            name: format!("{}_{}", job_name, sanitize_job_name(&job_id.to_string())),
            identifier: job_id.clone(),
            resources: app.job(&job_id)?.resources(),
            holds,
            restartable,
            project: project.map(str::to_string),
            args,
        };
        let grid_id = submitter.submit(&request)?;
        grid_ids.insert(job_id, grid_id);
    }

    if grid_ids.len() < 20 {
        let launched: Vec<&str> = grid_ids.values().map(GridJobId::as_str).collect();
        debug!("launched {}", launched.join(", "));
    } else {
        debug!("launched {} jobs", grid_ids.len());
    }
    Ok(grid_ids)
}
