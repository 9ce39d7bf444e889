//! Expanding task-array jobs into per-task graph nodes.

use std::fmt;

use gridflow_core::{Application, Dag, Identifier, JobGraph, Resources};

use crate::error::Result;

/// One shard of a job: the job's identifier plus a task index.
///
/// Task indices are 1-based for task arrays, matching the scheduler's
/// numbering. A job that is not an array gets the single synthetic
/// index 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    /// The job this task belongs to.
    pub job: Identifier,

    /// 1-based index within a task array, or 0 outside one.
    pub index: u32,
}

impl TaskId {
    /// Creates a task id.
    pub fn new(job: Identifier, index: u32) -> Self {
        Self { job, index }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.job, self.index)
    }
}

/// A job graph refined to one node per task.
pub type TaskGraph = Dag<TaskId>;

/// Task indices a job expands into.
///
/// An array job yields `1..=task_cnt`, unless the command line pinned
/// one index, in which case only that task is materialized. Anything
/// else yields the synthetic index 0.
pub fn task_indices(resources: &Resources, pinned: Option<u32>) -> Vec<u32> {
    if resources.is_task_array() {
        match pinned {
            Some(task_index) if task_index > 0 => vec![task_index],
            _ => (1..=resources.task_cnt()).collect(),
        }
    } else {
        vec![0]
    }
}

/// Takes a job graph and expands the jobs into tasks.
///
/// Every job has at least one task; jobs that are task arrays have
/// more. Each job-graph edge fans out to the full cross product of the
/// two jobs' tasks, carrying the edge's dependency attribute, because
/// array shards are independent slices of work and every downstream
/// shard needs all upstream shards finished. Nodes are added before
/// edges so a job with no dependencies still contributes its tasks.
pub fn expand_task_arrays(
    job_graph: &JobGraph,
    app: &dyn Application,
    pinned: Option<u32>,
) -> Result<TaskGraph> {
    let mut task_graph = TaskGraph::new();
    for job_id in job_graph.topological_order()? {
        let indices = task_indices(&app.job(&job_id)?.resources(), pinned);
        for &index in &indices {
            task_graph.add_node(TaskId::new(job_id.clone(), index));
        }
        for (pred_id, dependency) in job_graph.in_edges(&job_id) {
            let pred_indices = task_indices(&app.job(&pred_id)?.resources(), pinned);
            for &pred_index in &pred_indices {
                for &index in &indices {
                    task_graph.add_edge_with(
                        TaskId::new(pred_id.clone(), pred_index),
                        TaskId::new(job_id.clone(), index),
                        dependency,
                    );
                }
            }
        }
    }
    Ok(task_graph)
}
