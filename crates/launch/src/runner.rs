//! Subprocess execution for job processes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::info;

use crate::error::{LaunchError, Result};

/// Finds the full path to an executable on the PATH.
pub fn find_executable(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| LaunchError::ExecutableNotFound(name.to_string()))
}

/// Resolves a program reference: absolute and relative paths pass
/// through, bare names go through the PATH.
pub fn resolve_program(program: &Path) -> Result<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        Ok(program.to_path_buf())
    } else {
        find_executable(&program.to_string_lossy())
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs job subprocesses with a shared environment and an optional
/// timeout.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Extra environment variables for every child.
    env: HashMap<String, String>,

    /// How long a child may run before it is abandoned.
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Creates a runner with the parent's environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds environment variables.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    /// Sets the timeout for [`ProcessRunner::run`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds a resolved command with the runner's environment. The
    /// caller chooses how to wire stdio and wait.
    pub fn command(&self, program: &Path, args: &[String]) -> Result<Command> {
        let program = resolve_program(program)?;
        let mut command = Command::new(program);
        command.args(args).envs(&self.env);
        Ok(command)
    }

    /// Runs a command to completion, capturing its output.
    ///
    /// A non-zero exit is not an error here; callers read the exit
    /// code from the output. Timeouts and spawn failures are errors.
    pub async fn run(&self, program: &Path, args: &[String]) -> Result<ProcessOutput> {
        let mut command = self.command(program, args)?;
        command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = command.output();
        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, output).await.map_err(|_| {
                info!(program = %program.display(), "command timed out after {:?}", timeout);
                LaunchError::CommandTimeout {
                    program: program.to_path_buf(),
                    timeout,
                }
            })?,
            None => output.await,
        }
        .map_err(|source| LaunchError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

        Ok(ProcessOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_output() {
        let runner = ProcessRunner::new();
        let output = runner
            .run(Path::new("echo"), &["hello".to_string()])
            .await
            .unwrap();
        assert_eq!(output.exit_code, 0);
        assert!(output.stdout.trim().contains("hello"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_raised() {
        let runner = ProcessRunner::new();
        let output = runner
            .run(Path::new("false"), &[])
            .await
            .unwrap();
        assert_ne!(output.exit_code, 0);
    }

    #[tokio::test]
    async fn test_missing_executable_is_an_error() {
        let runner = ProcessRunner::new();
        let result = runner.run(Path::new("gridflow-no-such-tool"), &[]).await;
        assert!(matches!(result, Err(LaunchError::ExecutableNotFound(_))));
    }

    #[tokio::test]
    async fn test_timeout_fires() {
        let runner = ProcessRunner::new().with_timeout(Duration::from_millis(50));
        let result = runner
            .run(Path::new("sleep"), &["5".to_string()])
            .await;
        assert!(matches!(result, Err(LaunchError::CommandTimeout { .. })));
    }

    #[test]
    fn test_find_executable_resolves_sh() {
        let path = find_executable("sh").unwrap();
        assert!(path.is_absolute());
    }
}
