//! A balanced-tree test application: thirteen locations, one output
//! file each, children depending on their parent.

use std::path::{Path, PathBuf};

use clap::{Arg, ArgMatches, Command, value_parser};
use tracing::info;

use gridflow::{Application, CoreError, Entity, FileEntity, Identifier, Job, JobGraph};

pub struct LocationJob {
    location_id: i64,
    output: FileEntity,
}

impl LocationJob {
    pub fn new(location_id: i64, base_directory: &Path) -> Self {
        let out_file = base_directory
            .join("data")
            .join(format!("{}.hdf", location_id));
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
        info!("Running job {}", self.location_id);
        self.mock_run()
    }
}

pub struct LocationApp {
    pub base_directory: PathBuf,
}

impl LocationApp {
    pub fn new() -> Self {
        Self {
            base_directory: PathBuf::from("."),
        }
    }
}

/// A balanced tree with branching factor 3 and depth 2: 13 nodes.
pub fn balanced_tree() -> JobGraph {
    let mut graph = JobGraph::new();
    for parent in 0..4_i64 {
        for child in (3 * parent + 1)..=(3 * parent + 3) {
            graph.add_edge(Identifier::Integer(parent), Identifier::Integer(child));
        }
    }
    graph
}

impl Application for LocationApp {
    fn name(&self) -> String {
        "testapp37".to_string()
    }

    fn add_arguments(&self, command: Command) -> Command {
        command
            .arg(
                Arg::new("max-level")
                    .long("max-level")
                    .value_parser(value_parser!(u32)),
            )
            .arg(
                Arg::new("base-directory")
                    .long("base-directory")
                    .value_parser(value_parser!(PathBuf)),
            )
    }

    fn initialize(&mut self, matches: &ArgMatches) -> Result<(), CoreError> {
        if let Some(base_directory) = matches.get_one::<PathBuf>("base-directory") {
            self.base_directory = base_directory.clone();
        }
        Ok(())
    }

    fn job_graph(&self) -> JobGraph {
        balanced_tree()
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

/// The `.hdf` files under `<base>/data`.
pub fn data_files(base_directory: &Path) -> Vec<PathBuf> {
    let data = base_directory.join("data");
    match std::fs::read_dir(&data) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "hdf"))
            .collect(),
        Err(_) => Vec::new(),
    }
}
