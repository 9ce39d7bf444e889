//! Counting how many times a grid job has restarted.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// How many times has this job restarted?
///
/// Grid Engine tells a task that it restarted (`RESTARTED=1`) but not
/// how many times, so a marker file named after the job and task
/// gains one character per restart. A fresh run returns 0.
pub fn restart_count() -> u32 {
    restart_count_from(
        std::env::var("RESTARTED").ok().as_deref(),
        std::env::var("JOB_ID").ok().as_deref(),
        std::env::var("SGE_TASK_ID").ok().as_deref(),
        &std::env::temp_dir().join("gridflow-restarts"),
    )
}

fn restart_count_from(
    restarted: Option<&str>,
    job_id: Option<&str>,
    task_id: Option<&str>,
    marker_dir: &Path,
) -> u32 {
    match restarted {
        Some(flag) if !flag.is_empty() && flag != "0" => {}
        _ => return 0,
    }
    if fs::create_dir_all(marker_dir).is_err() {
        return 1;
    }
    let marker = marker_dir.join(format!(
        "{}.{}.restart",
        job_id.unwrap_or("unknown-job"),
        task_id.unwrap_or("unknown-task")
    ));
    let count = match fs::read_to_string(&marker) {
        Ok(content) => content.len() as u32 + 1,
        Err(_) => 1,
    };
    let appended = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&marker)
        .and_then(|mut file| file.write_all(b"."));
    if appended.is_err() {
        return 1;
    }
    count
}
