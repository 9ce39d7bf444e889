//! Per-job resource declarations.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Resources a job asks the scheduler for.
///
/// The three required fields must all be declared; range errors are
/// caught by [`Resources::validate`] before anything is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    /// Peak memory in gigabytes.
    pub memory_gigabytes: f64,

    /// Number of threads the job will use.
    pub threads: u32,

    /// Run time after which the scheduler may kill the job.
    pub run_time_minutes: f64,

    /// Number of tasks for a task-array job. Absent, or a value of 1,
    /// means an ordinary single-task job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_cnt: Option<u32>,
}

impl Resources {
    /// Creates a resource declaration for a single-task job.
    pub fn new(memory_gigabytes: f64, threads: u32, run_time_minutes: f64) -> Self {
        Self {
            memory_gigabytes,
            threads,
            run_time_minutes,
            task_cnt: None,
        }
    }

    /// Declares this job a task array with the given task count.
    pub fn with_task_cnt(mut self, task_cnt: u32) -> Self {
        self.task_cnt = Some(task_cnt);
        self
    }

    /// Effective task count. Every job has at least one task; only a
    /// declared count above 1 makes it a task array.
    pub fn task_cnt(&self) -> u32 {
        match self.task_cnt {
            Some(cnt) if cnt > 1 => cnt,
            _ => 1,
        }
    }

    /// Whether this job expands into more than one task.
    pub fn is_task_array(&self) -> bool {
        self.task_cnt() > 1
    }

    /// Checks value ranges, failing fast on a misdeclared job.
    pub fn validate(&self) -> Result<()> {
        if !(self.memory_gigabytes > 0.0) {
            return Err(CoreError::Misconfigured(format!(
                "memory_gigabytes must be positive, got {}",
                self.memory_gigabytes
            )));
        }
        if self.threads < 1 {
            return Err(CoreError::Misconfigured(
                "threads must be at least 1".to_string(),
            ));
        }
        if !(self.run_time_minutes > 0.0) {
            return Err(CoreError::Misconfigured(format!(
                "run_time_minutes must be positive, got {}",
                self.run_time_minutes
            )));
        }
        if self.task_cnt == Some(0) {
            return Err(CoreError::Misconfigured(
                "task_cnt must be at least 1 when declared".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Resources {
    /// One gigabyte, one thread, one minute.
    fn default() -> Self {
        Self::new(1.0, 1, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_cnt_defaults_to_one() {
        assert_eq!(Resources::default().task_cnt(), 1);
        assert!(!Resources::default().is_task_array());
    }

    #[test]
    fn test_task_cnt_of_one_is_not_an_array() {
        let resources = Resources::default().with_task_cnt(1);
        assert_eq!(resources.task_cnt(), 1);
        assert!(!resources.is_task_array());
    }

    #[test]
    fn test_task_array() {
        let resources = Resources::new(4.0, 2, 60.0).with_task_cnt(12);
        assert_eq!(resources.task_cnt(), 12);
        assert!(resources.is_task_array());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        assert!(Resources::new(0.0, 1, 1.0).validate().is_err());
        assert!(Resources::new(1.0, 0, 1.0).validate().is_err());
        assert!(Resources::new(1.0, 1, 0.0).validate().is_err());
        assert!(Resources::default().with_task_cnt(0).validate().is_err());
        assert!(Resources::default().validate().is_ok());
    }
}
