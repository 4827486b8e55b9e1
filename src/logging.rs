// File logging. The terminal is in raw mode while the app runs, so nothing
// may go to stdout or stderr.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins over the configured level.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber writing JSON lines to `log_path`.
///
/// Returns `None` (after telling the user) when the file cannot be opened or a
/// subscriber is already installed. Keep the guard alive until exit so
/// buffered lines get flushed.
pub fn init(log_path: &Path, default_level: &str) -> Option<WorkerGuard> {
    let file = match fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open log file {}: {e}", log_path.display());
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(default_level))
        .with(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true),
        );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
        return None;
    }

    tracing::info!(path = %log_path.display(), "logging initialized");

    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_filter_falls_back_on_garbage() {
        // An unparseable level must not panic.
        let filter = build_filter("[[[");
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn test_init_writes_json_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("guidance.log");

        let guard = init(&log_path, "info");
        assert!(guard.is_some());

        tracing::info!(answer = 42, "hello from the test");
        drop(guard);

        let contents = fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains("logging initialized"));
        assert!(contents.contains("hello from the test"));
        assert!(contents.lines().all(|line| line.starts_with('{')));
    }
}
