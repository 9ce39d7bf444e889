//! Fail-fast validation of an application before anything launches.

use gridflow_core::{Application, CoreError, JobSelection};

use crate::error::{EngineError, Result};

/// Checks an application's declarations up front.
///
/// Verifies that the job graph is acyclic, that every selected
/// identifier is a graph node, that each selected job's resource
/// declaration is in range, and that task-array jobs can clone a task.
/// Run before dispatching to any backend so a misdeclared job aborts
/// with zero side effects instead of failing mid-graph.
pub fn check_application(app: &dyn Application, selection: &JobSelection) -> Result<()> {
    let job_graph = app.job_graph();
    job_graph.topological_order()?;

    for identifier in app.job_identifiers(selection) {
        if !job_graph.contains(&identifier) {
            return Err(EngineError::UnknownJob(identifier));
        }
        let job = app.job(&identifier)?;
        let resources = job.resources();
        resources.validate().map_err(|err| match err {
            CoreError::Misconfigured(message) => {
                CoreError::Misconfigured(format!("job '{}': {}", identifier, message))
            }
            other => other,
        })?;
        if resources.is_task_array() {
            // Surfaces a missing task() override now, not mid-run.
            job.task(1)?;
        }
    }
    Ok(())
}
