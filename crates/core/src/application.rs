//! The application contract: how a program describes its jobs.

use clap::{ArgMatches, Command};

use crate::dag::JobGraph;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::job::Job;

/// The command-line selection of jobs and tasks, parsed from the
/// execution flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSelection {
    /// A single job named with `--job-id`, or all jobs when absent.
    pub job_id: Option<Identifier>,

    /// A single task index pinned with `--task-id` (or the
    /// `SGE_TASK_ID` environment), for task-array jobs.
    pub task_index: Option<u32>,

    /// Selected by `--run-dependents`: also run every job downstream
    /// of the selected ones.
    pub run_dependents: bool,

    /// Selected by `--continue`: skip jobs whose outputs already
    /// validate, rerunning descendants of anything incomplete.
    pub resume: bool,
}

impl JobSelection {
    /// Selects every job in the graph.
    pub fn all() -> Self {
        Self::default()
    }

    /// Selects a single job.
    pub fn single(job_id: Identifier) -> Self {
        Self {
            job_id: Some(job_id),
            ..Self::default()
        }
    }
}

/// A program built on gridflow: it owns the job graph and constructs
/// job objects on demand.
///
/// The framework calls `job_graph` and `job` freely; both should be
/// cheap, with jobs holding their entity declarations rather than
/// loaded data.
pub trait Application: Send + Sync {
    /// A short name, used to label grid-engine submissions.
    fn name(&self) -> String;

    /// Extends the execution command line with application flags.
    fn add_arguments(&self, command: Command) -> Command {
        command
    }

    /// Reads application flags after parsing, before any job runs.
    fn initialize(&mut self, matches: &ArgMatches) -> Result<()> {
        let _ = matches;
        Ok(())
    }

    /// The full dependency graph over job identifiers. Must be
    /// acyclic; edges mean "must complete first".
    fn job_graph(&self) -> JobGraph;

    /// Constructs the job for one identifier.
    fn job(&self, identifier: &Identifier) -> Result<Box<dyn Job>>;

    /// Resolves the command-line selection to target identifiers.
    /// The default honors `--job-id`, falling back to every node.
    fn job_identifiers(&self, selection: &JobSelection) -> Vec<Identifier> {
        match &selection.job_id {
            Some(job_id) => vec![job_id.clone()],
            None => self.job_graph().nodes(),
        }
    }

    /// Command-line flags that select one job in a child process.
    fn job_id_to_arguments(&self, identifier: &Identifier) -> Vec<String> {
        identifier.arguments()
    }
}
