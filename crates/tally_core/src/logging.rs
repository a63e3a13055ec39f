use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,tally_server=debug,tally_docs=debug";

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Initializes console logging, plus a daily-rotated file under `logs_dir`
/// when one is given.
///
/// Returns the file writer's guard, which must be kept alive for the
/// duration of the process so buffered lines are flushed.
pub fn init_logging(logs_dir: Option<&Path>, filter: &str) -> Result<Option<WorkerGuard>> {
    let Some(logs_dir) = logs_dir else {
        tracing_subscriber::registry()
            .with(env_filter(filter))
            .with(fmt::layer().with_target(false).compact())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;
        return Ok(None);
    };

    std::fs::create_dir_all(logs_dir)?;

    // File appender: daily rotation
    let file_appender = tracing_appender::rolling::daily(logs_dir, "tally");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(filter))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_creates_log_dir() {
        let tmp = tempfile::tempdir().expect("Failed to create tempdir");
        let logs_dir = tmp.path().join("nested").join("logs");
        assert!(!logs_dir.exists());

        // Only one global subscriber can be installed per process, so the
        // result may be an error; the directory is created either way.
        let result = init_logging(Some(&logs_dir), "warn");
        assert!(logs_dir.exists());

        if let Err(e) = result {
            assert!(e.to_string().contains("logging"), "unexpected error: {e}");
        }
    }

    #[test]
    fn test_default_filter_parses() {
        for f in [DEFAULT_FILTER, "warn", "tally_docs=trace,error"] {
            assert!(EnvFilter::try_new(f).is_ok(), "{f} should parse");
        }
    }
}
