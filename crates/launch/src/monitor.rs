//! Watching a submitted job through the scheduler's queue.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{LaunchError, Result};
use crate::submit::{QueueEntry, Submitter};

/// Where a monitored job is in its life.
///
/// Only three states matter: the window between submission and the
/// queue first showing the job, the time in the queue, and done. A
/// timeout carries the state it fired in, which distinguishes "never
/// got scheduled" from "stuck running".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Submitted, not yet seen in the queue.
    Initial,

    /// Seen in the queue at least once.
    Engine,

    /// The completion check passed.
    Done,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Engine => write!(f, "engine"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Timeouts and polling cadence for [`check_complete`].
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// How long the job may take to first appear in the queue.
    pub initial_timeout: Duration,

    /// How long the job may sit in the queue before being abandoned.
    pub run_timeout: Duration,

    /// Delay between queue polls.
    pub poll_interval: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            initial_timeout: Duration::from_secs(60),
            run_timeout: Duration::from_secs(60 * 60),
            poll_interval: Duration::from_secs(15),
        }
    }
}

impl MonitorOptions {
    /// Sets the in-queue timeout.
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Sets the polling delay.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Polls the queue until the job finishes, vanishes after running, or
/// exceeds a state timeout.
///
/// `identify_job` picks this run's entries out of the queue listing;
/// `check_done` is the caller's completion check (typically entity
/// validation). A job that leaves the queue after having been seen is
/// treated as finished and left to `check_done` on the caller's side;
/// a deleted or suspended entry fails immediately.
pub fn check_complete(
    submitter: &dyn Submitter,
    mut identify_job: impl FnMut(&QueueEntry) -> bool,
    mut check_done: impl FnMut() -> bool,
    options: &MonitorOptions,
) -> Result<()> {
    let mut state = MonitorState::Initial;
    let mut last = Instant::now();

    while state != MonitorState::Done && !check_done() {
        let queue = submitter.status()?;
        let mine: Vec<&QueueEntry> = queue.iter().filter(|entry| identify_job(entry)).collect();

        if !mine.is_empty() {
            debug!(count = mine.len(), "job entries in the queue");
            if state == MonitorState::Initial {
                last = Instant::now();
                state = MonitorState::Engine;
            }
            for entry in &mine {
                if entry.state.is_dead() {
                    return Err(LaunchError::JobDead {
                        name: entry.name.clone(),
                    });
                }
            }
        } else if state == MonitorState::Engine {
            debug!("job has left the queue");
            return Ok(());
        }

        let state_timeout = match state {
            MonitorState::Initial => options.initial_timeout,
            MonitorState::Engine => options.run_timeout,
            MonitorState::Done => Duration::ZERO,
        };
        if last.elapsed() > state_timeout {
            return Err(LaunchError::Timeout {
                state,
                waited: last.elapsed(),
            });
        }
        std::thread::sleep(options.poll_interval);
    }
    Ok(())
}
