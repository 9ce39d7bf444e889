//! The job trait: a unit of work with declared resources and outputs.

use crate::entity::Entity;
use crate::error::{CoreError, Result};
use crate::identifier::Identifier;
use crate::resources::Resources;

/// A unit of work in the job graph.
///
/// Implementations declare their resource needs and output entities;
/// the default `done` and `mock_run` derive from those declarations,
/// so most jobs only implement `identifier` and `run`.
pub trait Job: Send + Sync {
    /// The identifier naming this job in the graph.
    fn identifier(&self) -> Identifier;

    /// Resource needs. The default asks for one gigabyte, one
    /// thread, one minute.
    fn resources(&self) -> Resources {
        Resources::default()
    }

    /// Entities this job reads.
    fn inputs(&self) -> Vec<&dyn Entity> {
        Vec::new()
    }

    /// Entities this job writes. Completion is judged from these.
    fn outputs(&self) -> Vec<&dyn Entity> {
        Vec::new()
    }

    /// Performs the work.
    fn run(&self) -> Result<()>;

    /// Dry run: checks the inputs are present and fabricates
    /// placeholder outputs.
    fn mock_run(&self) -> Result<()> {
        for input in self.inputs() {
            input.validate()?;
        }
        for output in self.outputs() {
            output.mock()?;
        }
        Ok(())
    }

    /// Whether every declared output validates.
    ///
    /// An entity that cannot be examined at all propagates as an error;
    /// guessing either way would corrupt the re-run decision.
    fn done(&self) -> Result<bool> {
        for output in self.outputs() {
            if !output.validate()?.is_valid() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Clones one task of a task-array job.
    ///
    /// Jobs that declare `task_cnt` above 1 must override this; the
    /// default makes the omission a configuration error caught before
    /// execution.
    fn task(&self, task_index: u32) -> Result<Box<dyn Job>> {
        let _ = task_index;
        Err(CoreError::Misconfigured(format!(
            "job '{}' declares a task array but does not implement task()",
            self.identifier()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FileEntity;
    use tempfile::tempdir;

    struct FileJob {
        output: FileEntity,
    }

    impl Job for FileJob {
        fn identifier(&self) -> Identifier {
            Identifier::Integer(1)
        }

        fn outputs(&self) -> Vec<&dyn Entity> {
            vec![&self.output]
        }

        fn run(&self) -> Result<()> {
            self.mock_run()
        }
    }

    #[test]
    fn test_done_follows_outputs() {
        let dir = tempdir().unwrap();
        let job = FileJob {
            output: FileEntity::new(dir.path().join("out.txt")),
        };

        assert!(!job.done().unwrap());
        job.run().unwrap();
        assert!(job.done().unwrap());
    }

    #[test]
    fn test_job_without_outputs_is_done() {
        struct Bare;
        impl Job for Bare {
            fn identifier(&self) -> Identifier {
                Identifier::Integer(0)
            }
            fn run(&self) -> Result<()> {
                Ok(())
            }
        }
        assert!(Bare.done().unwrap());
    }

    #[test]
    fn test_default_task_is_a_configuration_error() {
        struct Bare;
        impl Job for Bare {
            fn identifier(&self) -> Identifier {
                Identifier::Integer(0)
            }
            fn run(&self) -> Result<()> {
                Ok(())
            }
        }
        assert!(matches!(
            Bare.task(1),
            Err(CoreError::Misconfigured(_))
        ));
    }
}
