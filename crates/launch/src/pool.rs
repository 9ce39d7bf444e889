//! The memory-bounded local process pool.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{debug, warn};

use gridflow_core::{Application, CoreError};
use gridflow_engine::{TaskGraph, TaskId, find_runnable};

use crate::args::{StripFlags, setup_args_for_job};
use crate::error::{LaunchError, Result};
use crate::runner::ProcessRunner;

/// Everything needed to launch one task as a subprocess.
#[derive(Debug, Clone)]
pub struct LaunchDescription {
    /// The task this process will run.
    pub task: TaskId,

    /// The task's declared memory need, counted against the budget.
    pub memory_gigabytes: f64,

    /// Program to execute.
    pub program: PathBuf,

    /// Arguments, already rewritten to select this task.
    pub args: Vec<String>,
}

/// A source of runnable work for the pool driver: given what has
/// completed, what could launch right now?
pub trait RunnableSource {
    /// Launch descriptions for every currently runnable task.
    fn next_batch(&mut self, completed: &HashSet<TaskId>) -> Result<Vec<LaunchDescription>>;

    /// Every task this source will ever produce.
    fn tasks(&self) -> Vec<TaskId>;
}

/// The standard runnable source: re-derives each task's command line
/// from this process's own invocation.
pub struct RunNext<'a> {
    app: &'a dyn Application,
    task_graph: &'a TaskGraph,
    strip: &'a StripFlags,
    arg_list: Vec<String>,
}

impl<'a> RunNext<'a> {
    /// Creates a runnable source over an expanded task graph.
    pub fn new(
        app: &'a dyn Application,
        task_graph: &'a TaskGraph,
        strip: &'a StripFlags,
        arg_list: Vec<String>,
    ) -> Self {
        Self {
            app,
            task_graph,
            strip,
            arg_list,
        }
    }
}

impl RunnableSource for RunNext<'_> {
    fn next_batch(&mut self, completed: &HashSet<TaskId>) -> Result<Vec<LaunchDescription>> {
        let keep: HashSet<TaskId> = self
            .task_graph
            .nodes()
            .into_iter()
            .filter(|task| !completed.contains(task))
            .collect();
        let remaining = self.task_graph.induced_subgraph(&keep);
        let runnable = find_runnable(&remaining)?;

        let program = std::env::current_exe()?;
        let mut descriptions = Vec::with_capacity(runnable.len());
        for task in runnable {
            let job_select = self.app.job_id_to_arguments(&task.job);
            let mut args = setup_args_for_job(self.strip, &job_select, &self.arg_list);
            if task.index > 0 {
                args.push("--task-id".to_string());
                args.push(task.index.to_string());
            }
            let job = self.app.job(&task.job)?;
            descriptions.push(LaunchDescription {
                memory_gigabytes: job.resources().memory_gigabytes,
                task,
                program: program.clone(),
                args,
            });
        }
        Ok(descriptions)
    }

    fn tasks(&self) -> Vec<TaskId> {
        self.task_graph.nodes()
    }
}

/// Pool limits.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Total gigabytes the running children may claim together.
    pub memory_limit_gigabytes: f64,

    /// Cap on simultaneously running children.
    pub max_processes: usize,
}

impl PoolOptions {
    /// Creates options with the given memory budget and a process cap
    /// of the machine's CPU count.
    pub fn new(memory_limit_gigabytes: f64) -> Self {
        Self {
            memory_limit_gigabytes,
            max_processes: num_cpus::get().max(1),
        }
    }

    /// Overrides the process cap.
    pub fn with_max_processes(mut self, max: usize) -> Self {
        self.max_processes = max.max(1);
        self
    }
}

/// What the pool did.
#[derive(Debug)]
pub struct PoolReport {
    /// Tasks that finished successfully, in completion order.
    pub completed: Vec<TaskId>,

    /// Tasks that exited non-zero, with their exit codes.
    pub failed: Vec<(TaskId, i32)>,

    /// Tasks that never became runnable because a dependency failed.
    pub blocked: Vec<TaskId>,

    /// Wall-clock duration of the whole run.
    pub duration: Duration,
}

impl PoolReport {
    /// True when every task completed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.blocked.is_empty()
    }
}

/// Drives the pool: repeatedly asks the source what is runnable,
/// launches greedily under the memory budget and process cap, and
/// feeds each completion back in until no work remains.
///
/// A failing task is recorded and never relaunched; because it never
/// enters the completed set, its descendants stay unrunnable and are
/// reported blocked. Retrying is the caller's policy.
pub async fn graph_do(source: &mut dyn RunnableSource, options: &PoolOptions) -> Result<PoolReport> {
    let start = Instant::now();
    let runner = ProcessRunner::new();

    let mut completed: HashSet<TaskId> = HashSet::new();
    let mut completed_order: Vec<TaskId> = Vec::new();
    let mut failed: Vec<(TaskId, i32)> = Vec::new();
    let mut failed_set: HashSet<TaskId> = HashSet::new();
    let mut running: HashSet<TaskId> = HashSet::new();
    let mut memory_in_use = 0.0_f64;
    let mut children: JoinSet<(TaskId, f64, std::io::Result<std::process::ExitStatus>)> =
        JoinSet::new();

    loop {
        let batch = source.next_batch(&completed)?;
        let pending: Vec<LaunchDescription> = batch
            .into_iter()
            .filter(|desc| !running.contains(&desc.task) && !failed_set.contains(&desc.task))
            .collect();

        if pending.is_empty() && running.is_empty() {
            break;
        }

        for desc in pending {
            if desc.memory_gigabytes > options.memory_limit_gigabytes {
                return Err(CoreError::Misconfigured(format!(
                    "task {} needs {} GB, above the {} GB pool budget",
                    desc.task, desc.memory_gigabytes, options.memory_limit_gigabytes
                ))
                .into());
            }
            if running.len() >= options.max_processes
                || memory_in_use + desc.memory_gigabytes > options.memory_limit_gigabytes
            {
                // Revisited after the next completion frees room.
                continue;
            }

            let mut command = runner.command(&desc.program, &desc.args)?;
            command.kill_on_drop(true);
            let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
                program: desc.program.clone(),
                source,
            })?;
            debug!(task = %desc.task, memory = desc.memory_gigabytes, "launching task");
            running.insert(desc.task.clone());
            memory_in_use += desc.memory_gigabytes;
            let task = desc.task;
            let memory = desc.memory_gigabytes;
            children.spawn(async move {
                let status = child.wait().await;
                (task, memory, status)
            });
        }

        let (task, memory, status) = match children.join_next().await {
            Some(joined) => joined.map_err(|err| LaunchError::Pool(err.to_string()))?,
            None => break,
        };
        running.remove(&task);
        memory_in_use -= memory;
        match status {
            Ok(exit) if exit.success() => {
                completed.insert(task.clone());
                completed_order.push(task);
            }
            Ok(exit) => {
                let code = exit.code().unwrap_or(-1);
                warn!(task = %task, code, "task failed");
                failed_set.insert(task.clone());
                failed.push((task, code));
            }
            Err(err) => {
                warn!(task = %task, error = %err, "task could not be waited on");
                failed_set.insert(task.clone());
                failed.push((task, -1));
            }
        }
    }

    let blocked: Vec<TaskId> = source
        .tasks()
        .into_iter()
        .filter(|task| !completed.contains(task) && !failed_set.contains(task))
        .collect();

    Ok(PoolReport {
        completed: completed_order,
        failed,
        blocked,
        duration: start.elapsed(),
    })
}
