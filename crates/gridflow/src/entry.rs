//! The framework entry point and backend dispatch.

use clap::ArgMatches;
use tracing::{debug, error};

use gridflow_core::{Application, Job, Resources, Result as CoreResult};
use gridflow_engine::{
    check_application, execution_ordered, expand_task_arrays, job_subset,
};
use gridflow_launch::{PoolOptions, RunNext, StripFlags, Submitter, graph_do, launch_jobs};

use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::logging::init_logging;
use crate::output;
use crate::parser::{ExecutionArgs, execution_command};
use crate::restart::restart_count;

/// Return codes Grid Engine recognizes. Any other code is treated as
/// OK; only 100 makes the engine delete the jobs holding for this
/// one. See `man sge_diagnostics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Ok,
    RequestRestart,
    FailAndDeleteHoldingJobs,
}

impl ReturnCode {
    /// The numeric process exit code.
    pub fn code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::RequestRestart => 99,
            Self::FailAndDeleteHoldingJobs => 100,
        }
    }
}

impl From<ReturnCode> for std::process::ExitCode {
    fn from(code: ReturnCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

/// Starts the application. Use it from `main`:
///
/// ```no_run
/// use std::process::ExitCode;
/// # use gridflow_core::{Application, Identifier, Job, JobGraph};
/// # struct MyApplication;
/// # impl Application for MyApplication {
/// #     fn name(&self) -> String { "my-app".to_string() }
/// #     fn job_graph(&self) -> JobGraph { JobGraph::new() }
/// #     fn job(&self, _: &Identifier) -> gridflow_core::Result<Box<dyn Job>> {
/// #         unimplemented!()
/// #     }
/// # }
///
/// fn main() -> ExitCode {
///     let mut app = MyApplication;
///     gridflow::entry(&mut app, None).into()
/// }
/// ```
///
/// `arg_list` replaces the process arguments, which tests use to
/// drive runs in-process. Grid-engine dispatch needs [`entry_with`].
pub fn entry(app: &mut dyn Application, arg_list: Option<&[&str]>) -> ReturnCode {
    entry_with(app, None, arg_list)
}

/// [`entry`] with a scheduler wrapper for `--grid-engine` runs.
pub fn entry_with(
    app: &mut dyn Application,
    submitter: Option<&mut dyn Submitter>,
    arg_list: Option<&[&str]>,
) -> ReturnCode {
    let raw: Vec<String> = match arg_list {
        Some(args) => args.iter().map(|s| s.to_string()).collect(),
        None => std::env::args().skip(1).collect(),
    };

    let (command, strip) = execution_command();
    let command = app.add_arguments(command.name(app.name()));
    let matches = match command.try_get_matches_from(
        std::iter::once(app.name()).chain(raw.iter().cloned()),
    ) {
        Ok(matches) => matches,
        Err(err) => {
            use clap::error::ErrorKind;
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ReturnCode::Ok,
                _ => ReturnCode::FailAndDeleteHoldingJobs,
            };
        }
    };

    let args = ExecutionArgs::from_matches(&matches);
    init_logging(args.verbose, args.quiet);
    let restart_cnt = restart_count();

    match dispatch(app, submitter, &matches, &args, &strip, &raw) {
        Ok(()) => ReturnCode::Ok,
        Err(err) => {
            error!(error = %err, "run failed");
            output::error(&err.to_string());
            let may_restart = args
                .rerun_cnt
                .is_some_and(|limit| restart_cnt < limit);
            if err.is_misconfiguration() && may_restart {
                ReturnCode::RequestRestart
            } else {
                ReturnCode::FailAndDeleteHoldingJobs
            }
        }
    }
}

/// Initializes and validates the application, then runs the selected
/// backend.
fn dispatch(
    app: &mut dyn Application,
    submitter: Option<&mut dyn Submitter>,
    matches: &ArgMatches,
    args: &ExecutionArgs,
    strip: &StripFlags,
    raw: &[String],
) -> Result<()> {
    app.initialize(matches)?;
    check_application(&*app, &args.selection)?;

    if args.grid_engine {
        let submitter = submitter.ok_or(GridError::NoSubmitter)?;
        let config = GridConfig::load(None)?;
        let project = args.project.clone().unwrap_or(config.project);
        let grid_ids = launch_jobs(
            &*app,
            submitter,
            &args.selection,
            &args.run_id,
            Some(&project),
            args.rerun_cnt.is_some(),
            strip,
            raw,
        )?;
        output::success(&format!("submitted {} jobs", grid_ids.len()));
        Ok(())
    } else if let Some(memory_limit) = args.memory_limit {
        multiprocess_jobs(&*app, args, strip, raw, memory_limit)
    } else {
        run_jobs(&*app, args)
    }
}

/// Direct in-process execution in dependency order.
fn run_jobs(app: &dyn Application, args: &ExecutionArgs) -> Result<()> {
    let job_graph = job_subset(app, &args.selection)?;
    let order = execution_ordered(&job_graph)?;
    if args.mock_job {
        output::info("Mock mode - jobs fabricate placeholder outputs");
    }

    let progress = output::job_progress(order.len() as u64);
    for identifier in order {
        progress.set_message(identifier.to_string());
        let job = app.job(&identifier)?;
        for task in iterate_tasks(job, args.selection.task_index)? {
            if args.mock_job {
                task.mock_run()?;
            } else {
                task.run()?;
            }
        }
        progress.inc(1);
    }
    let completed = progress.position() as usize;
    progress.finish_and_clear();
    output::run_summary(completed, 0, 0);
    Ok(())
}

/// Walks through the tasks to run for one job: the job itself, its
/// full task range, or a single pinned task.
fn iterate_tasks(job: Box<dyn Job>, pinned: Option<u32>) -> CoreResult<Vec<Box<dyn Job>>> {
    let resources: Resources = job.resources();
    if resources.is_task_array() {
        match pinned {
            Some(task_index) if task_index > 0 => Ok(vec![job.task(task_index)?]),
            _ => (1..=resources.task_cnt()).map(|index| job.task(index)).collect(),
        }
    } else {
        Ok(vec![job])
    }
}

/// The memory-bounded local pool backend.
fn multiprocess_jobs(
    app: &dyn Application,
    args: &ExecutionArgs,
    strip: &StripFlags,
    raw: &[String],
    memory_limit: f64,
) -> Result<()> {
    let job_graph = job_subset(app, &args.selection)?;
    let task_graph = expand_task_arrays(&job_graph, app, args.selection.task_index)?;
    debug!("{} tasks to run", task_graph.node_count());

    let mut run_next = RunNext::new(app, &task_graph, strip, raw.to_vec());
    let options = PoolOptions::new(memory_limit);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(graph_do(&mut run_next, &options))?;

    output::run_summary(
        report.completed.len(),
        report.failed.len(),
        report.blocked.len(),
    );
    if report.is_success() {
        Ok(())
    } else {
        Err(GridError::PoolFailed {
            failed: report.failed.len(),
            blocked: report.blocked.len(),
        })
    }
}
