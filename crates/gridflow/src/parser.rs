//! The execution command line shared by every gridflow application.

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use rand::Rng;

use gridflow_core::{Identifier, JobSelection};
use gridflow_launch::StripFlags;

/// Builds the execution parser and the list of flags that must be
/// stripped before re-invoking the program for a single job.
///
/// `--run-id`, `--rerun-cnt`, and `--mock-job` deliberately pass
/// through to children: a child job keeps the run's identity, its
/// restart allowance, and its mock mode.
pub fn execution_command() -> (Command, StripFlags) {
    let mut strip = StripFlags::new();

    let command = Command::new("gridflow")
        .arg(
            Arg::new("grid-engine")
                .long("grid-engine")
                .action(ArgAction::SetTrue)
                .help_heading("Grid Engine")
                .help("Submit jobs to the grid engine instead of running locally"),
        )
        .arg(
            Arg::new("project")
                .long("project")
                .value_name("NAME")
                .help_heading("Grid Engine")
                .help("Accounting project for grid submissions"),
        )
        .arg(
            Arg::new("rerun-cnt")
                .long("rerun-cnt")
                .value_parser(value_parser!(u32))
                .help_heading("Grid Engine")
                .help("Allow each failed job to be rerun up to this many times"),
        )
        .arg(
            Arg::new("run-id")
                .long("run-id")
                .default_value(random_run_id())
                .help_heading("Grid Engine")
                .help("Token added to job names so qstat and qdel can find this run"),
        )
        .arg(
            Arg::new("task-id")
                .long("task-id")
                .value_parser(value_parser!(u32))
                .default_value(sge_task_id().to_string())
                .help_heading("Grid Engine")
                .help(
                    "1-based task index within a task array; 0 outside one. \
                     Defaults from the SGE_TASK_ID environment variable",
                ),
        )
        .arg(
            Arg::new("memory-limit")
                .long("memory-limit")
                .value_parser(value_parser!(f64))
                .value_name("GIGABYTES")
                .help_heading("Multiprocess")
                .help(
                    "Run the whole job graph on this machine in parallel \
                     processes, within this total memory budget",
                ),
        )
        .arg(
            Arg::new("job-id")
                .long("job-id")
                .value_name("ID")
                .help_heading("Job Graph")
                .help("Run only the job with this identifier"),
        )
        .arg(
            Arg::new("continue")
                .long("continue")
                .action(ArgAction::SetTrue)
                .help_heading("Job Graph")
                .help(
                    "Check each job's output entities and rerun only what is \
                     missing, plus everything downstream of it",
                ),
        )
        .arg(
            Arg::new("run-dependents")
                .long("run-dependents")
                .action(ArgAction::SetTrue)
                .help_heading("Job Graph")
                .help("Also run every job that depends on the selected ones"),
        )
        .arg(
            Arg::new("verbose-app")
                .long("verbose-app")
                .action(ArgAction::Count)
                .help_heading("Debugging and Logging")
                .help("Increase verbosity of logging"),
        )
        .arg(
            Arg::new("quiet-app")
                .long("quiet-app")
                .action(ArgAction::Count)
                .help_heading("Debugging and Logging")
                .help("Decrease verbosity of logging"),
        )
        .arg(
            Arg::new("mock-job")
                .long("mock-job")
                .action(ArgAction::SetTrue)
                .help_heading("Debugging and Logging")
                .help("Don't run jobs. Ask them to make fake outputs"),
        );

    strip.insert("--grid-engine", false);
    strip.insert("--project", true);
    strip.insert("--task-id", true);
    strip.insert("--memory-limit", true);
    strip.insert("--continue", false);
    strip.insert("--run-dependents", false);
    strip.insert("--verbose-app", false);
    strip.insert("--quiet-app", false);

    (command, strip)
}

/// The typed view of the execution flags.
#[derive(Debug, Clone)]
pub struct ExecutionArgs {
    pub grid_engine: bool,
    pub project: Option<String>,
    pub rerun_cnt: Option<u32>,
    pub run_id: String,
    pub memory_limit: Option<f64>,
    pub mock_job: bool,
    pub verbose: u8,
    pub quiet: u8,
    pub selection: JobSelection,
}

impl ExecutionArgs {
    /// Reads the execution flags out of parsed matches.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let job_id = matches
            .get_one::<String>("job-id")
            .and_then(|raw| raw.parse::<Identifier>().ok());
        let task_index = matches
            .get_one::<u32>("task-id")
            .copied()
            .filter(|index| *index > 0);
        Self {
            grid_engine: matches.get_flag("grid-engine"),
            project: matches.get_one::<String>("project").cloned(),
            rerun_cnt: matches.get_one::<u32>("rerun-cnt").copied(),
            run_id: matches
                .get_one::<String>("run-id")
                .cloned()
                .unwrap_or_default(),
            memory_limit: matches.get_one::<f64>("memory-limit").copied(),
            mock_job: matches.get_flag("mock-job"),
            verbose: matches.get_count("verbose-app"),
            quiet: matches.get_count("quiet-app"),
            selection: JobSelection {
                job_id,
                task_index,
                run_dependents: matches.get_flag("run-dependents"),
                resume: matches.get_flag("continue"),
            },
        }
    }
}

/// The task id a grid engine hands this process, if any. The variable
/// can hold the literal string `undefined`.
fn sge_task_id() -> u32 {
    std::env::var("SGE_TASK_ID")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// A short hex token distinguishing this run's job names.
fn random_run_id() -> String {
    let mut rng = rand::rng();
    (0..3).map(|_| format!("{:02x}", rng.random::<u8>())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ExecutionArgs {
        let (command, _strip) = execution_command();
        let matches = command
            .try_get_matches_from(std::iter::once("app").chain(args.iter().copied()))
            .unwrap();
        ExecutionArgs::from_matches(&matches)
    }

    #[test]
    fn test_defaults_select_everything_locally() {
        let args = parse(&[]);
        assert!(!args.grid_engine);
        assert!(args.memory_limit.is_none());
        assert!(!args.mock_job);
        assert_eq!(args.selection, JobSelection::all());
        assert_eq!(args.run_id.len(), 6);
    }

    #[test]
    fn test_job_id_parses_by_kind() {
        let args = parse(&["--job-id", "7"]);
        assert_eq!(args.selection.job_id, Some(Identifier::Integer(7)));
        let args = parse(&["--job-id", "fit_all"]);
        assert_eq!(args.selection.job_id, Some(Identifier::text("fit_all")));
    }

    #[test]
    fn test_graph_flags() {
        let args = parse(&["--continue", "--run-dependents"]);
        assert!(args.selection.resume);
        assert!(args.selection.run_dependents);
    }

    #[test]
    fn test_verbosity_counts() {
        let args = parse(&["--verbose-app", "--verbose-app", "--quiet-app"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.quiet, 1);
    }

    #[test]
    fn test_grid_flags() {
        let args = parse(&[
            "--grid-engine",
            "--project",
            "proj_a",
            "--rerun-cnt",
            "3",
            "--run-id",
            "ab12",
        ]);
        assert!(args.grid_engine);
        assert_eq!(args.project.as_deref(), Some("proj_a"));
        assert_eq!(args.rerun_cnt, Some(3));
        assert_eq!(args.run_id, "ab12");
    }

    #[test]
    fn test_task_id_zero_is_unpinned() {
        let args = parse(&["--task-id", "0"]);
        assert_eq!(args.selection.task_index, None);
        let args = parse(&["--task-id", "4"]);
        assert_eq!(args.selection.task_index, Some(4));
    }

    #[test]
    fn test_memory_limit() {
        let args = parse(&["--memory-limit", "16.5"]);
        assert_eq!(args.memory_limit, Some(16.5));
    }
}
