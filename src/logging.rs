use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber for the server.
///
/// `RUST_LOG` wins over `logging.level`. When `logging.dir` is set and writable, a
/// daily rolling `appraise.log` is written alongside the console. Keep the returned
/// guard alive for the life of the process so buffered file lines are flushed.
pub fn init_logging(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    let (file_layer, guard) = match cfg.dir.as_deref().and_then(writable_log_dir) {
        Some(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "appraise.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false) // No color codes in file
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let (json_layer, console_layer) = if cfg.json {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            ),
            None,
        )
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
        )
    };

    let file_logging_enabled = file_layer.is_some();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init();

    if let (true, Some(dir)) = (file_logging_enabled, cfg.dir.as_deref()) {
        eprintln!("Logging to: {}/appraise.log", dir);
    }
    guard
}

/// Minimal logging for one-shot CLI commands
pub fn init_logging_simple() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

// `tracing_appender::rolling::daily` panics if it cannot create the first file, so
// check writability up front.
fn writable_log_dir(dir: &str) -> Option<&str> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Warning: Could not create log directory {dir} ({e}), file logging disabled");
        return None;
    }
    let probe = std::path::Path::new(dir).join(".appraise_write_test");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&probe)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            Some(dir)
        }
        Err(e) => {
            eprintln!("Warning: Could not write to log directory {dir} ({e}), file logging disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writable_dir_is_accepted_and_created() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("logs/nested");
        let nested = nested.to_str().unwrap();
        assert_eq!(writable_log_dir(nested), Some(nested));
        assert!(std::path::Path::new(nested).is_dir());
    }
}
