//! Terminal output for runs.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), message);
}

/// Creates a progress bar over a sequence of jobs.
pub fn job_progress(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("█▓░"),
    );
    bar
}

/// Prints the end-of-run summary line.
pub fn run_summary(completed: usize, failed: usize, blocked: usize) {
    if failed > 0 || blocked > 0 {
        println!(
            "{}: {} completed, {} failed, {} blocked",
            style("FAILED").red().bold(),
            completed,
            failed,
            blocked
        );
    } else {
        println!(
            "{}: {} completed",
            style("SUCCESS").green().bold(),
            completed
        );
    }
}
