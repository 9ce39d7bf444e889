//! Logging setup driven by the `--verbose-app`/`--quiet-app` counts.
//!
//! Level resolution: the `GRIDFLOW_LOG` environment variable wins when
//! set; otherwise the verbosity counts offset the default `info`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Initialise the global logging subscriber.
///
/// Safe to call repeatedly; later calls are no-ops, which matters when
/// tests drive `entry` several times in one process.
pub fn init_logging(verbose: u8, quiet: u8) {
    let filter = match EnvFilter::try_from_env("GRIDFLOW_LOG") {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(level_from_counts(verbose, quiet).to_string()),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn level_from_counts(verbose: u8, quiet: u8) -> Level {
    match i16::from(verbose) - i16::from(quiet) {
        offset if offset <= -2 => Level::ERROR,
        -1 => Level::WARN,
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_offset_the_default_level() {
        assert_eq!(level_from_counts(0, 0), Level::INFO);
        assert_eq!(level_from_counts(1, 0), Level::DEBUG);
        assert_eq!(level_from_counts(2, 0), Level::TRACE);
        assert_eq!(level_from_counts(0, 1), Level::WARN);
        assert_eq!(level_from_counts(0, 3), Level::ERROR);
        assert_eq!(level_from_counts(1, 1), Level::INFO);
    }
}
