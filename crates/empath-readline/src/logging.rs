//! File logging so diagnostics never interleave with the consultation on stdout.

use empath_core::config::LoggingConfig;
use empath_infrastructure::EmpathPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "empath.log";

/// Installs the global subscriber writing to `logs/empath.log.YYYY-MM-DD`.
///
/// `RUST_LOG` overrides the configured level. Returns `None` (logging
/// disabled) when the log directory cannot be created.
pub fn init(paths: &EmpathPaths, config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let logs_dir = paths.logs_dir().ok()?;
    std::fs::create_dir_all(&logs_dir).ok()?;

    let appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .ok()?;

    Some(guard)
}
