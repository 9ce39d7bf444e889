//! Example application: a location hierarchy where every location's
//! job writes one summary file, children depending on their parent.
//!
//! Run the whole tree locally:
//!
//! ```text
//! location-hierarchy --base-directory /tmp/locations
//! ```
//!
//! or as a bounded pool of subprocesses:
//!
//! ```text
//! location-hierarchy --base-directory /tmp/locations --memory-limit 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Arg, ArgMatches, Command, value_parser};
use tracing::info;

use gridflow::{
    Application, CoreError, Entity, FileEntity, Identifier, Job, JobGraph, entry,
};

struct LocationJob {
    location_id: i64,
    output: FileEntity,
}

impl LocationJob {
    fn new(location_id: i64, base_directory: &Path) -> Self {
        let out_file = base_directory
            .join("data")
            .join(format!("{}.csv", location_id));
        Self {
            location_id,
            output: FileEntity::new(out_file),
        }
    }
}

impl Job for LocationJob {
    fn identifier(&self) -> Identifier {
        Identifier::Integer(self.location_id)
    }

    fn outputs(&self) -> Vec<&dyn Entity> {
        vec![&self.output]
    }

    fn run(&self) -> Result<(), CoreError> {
        info!("summarizing location {}", self.location_id);
        let path = self.output.prepare()?;
        fs::write(path, format!("location,{}\n", self.location_id))?;
        Ok(())
    }
}

struct LocationApp {
    base_directory: PathBuf,
    branching: i64,
    depth: u32,
}

impl LocationApp {
    fn new() -> Self {
        Self {
            base_directory: PathBuf::from("."),
            branching: 3,
            depth: 2,
        }
    }

    fn location_count(&self) -> i64 {
        // 1 + b + b^2 + ... + b^depth
        (0..=self.depth).map(|level| self.branching.pow(level)).sum()
    }
}

impl Application for LocationApp {
    fn name(&self) -> String {
        "location-hierarchy".to_string()
    }

    fn add_arguments(&self, command: Command) -> Command {
        command
            .arg(
                Arg::new("base-directory")
                    .long("base-directory")
                    .value_parser(value_parser!(PathBuf))
                    .help("Where the location files land"),
            )
            .arg(
                Arg::new("max-level")
                    .long("max-level")
                    .value_parser(value_parser!(u32))
                    .help("Depth of the location tree"),
            )
    }

    fn initialize(&mut self, matches: &ArgMatches) -> Result<(), CoreError> {
        if let Some(base_directory) = matches.get_one::<PathBuf>("base-directory") {
            self.base_directory = base_directory.clone();
        }
        if let Some(max_level) = matches.get_one::<u32>("max-level") {
            self.depth = *max_level;
        }
        Ok(())
    }

    fn job_graph(&self) -> JobGraph {
        let mut graph = JobGraph::new();
        let interior = (self.location_count() - self.branching.pow(self.depth)).max(0);
        for parent in 0..interior {
            for child_slot in 1..=self.branching {
                let child = self.branching * parent + child_slot;
                graph.add_edge(Identifier::Integer(parent), Identifier::Integer(child));
            }
        }
        if interior == 0 {
            graph.add_node(Identifier::Integer(0));
        }
        graph
    }

    fn job(&self, identifier: &Identifier) -> Result<Box<dyn Job>, CoreError> {
        match identifier {
            Identifier::Integer(location_id) => Ok(Box::new(LocationJob::new(
                *location_id,
                &self.base_directory,
            ))),
            other => Err(CoreError::JobNotFound(other.clone())),
        }
    }
}

fn main() -> ExitCode {
    let mut app = LocationApp::new();
    entry(&mut app, None).into()
}
