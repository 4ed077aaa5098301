use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "scheduler.log";
const FALLBACK_FILTER: &str = "genius_algo=info";

/// Keeps the non-blocking file writer flushing until dropped
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn file_writer(log_dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber for a host application embedding the scheduler.
///
/// Scheduler events go to stdout, and additionally to a daily rolling file
/// under `log_dir` when one is given. An existing global subscriber is left in
/// place, in which case no guard is returned.
pub fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER));

    let file = match log_dir.map(|dir| (dir, file_writer(dir))) {
        Some((_, Ok(writer))) => Some(writer),
        Some((dir, Err(err))) => {
            eprintln!("failed to open scheduler log in {}: {err}", dir.display());
            None
        }
        None => None,
    };
    let (writer, guard) = file.unzip();
    let file_layer = writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
    });

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .is_ok();

    guard
        .filter(|_| installed)
        .map(|guard| FileLogGuard { _guard: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_writer_creates_log_dir() {
        let dir = std::env::temp_dir().join(format!("genius-algo-logs-{}", uuid::Uuid::new_v4()));
        assert!(!dir.exists());

        let (_writer, _guard) = file_writer(&dir).unwrap();
        assert!(dir.is_dir());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_init_tracing_is_repeatable() {
        let _first = init_tracing("genius_algo=debug", None);
        let second = init_tracing("not a [valid filter", None);
        assert!(second.is_none());
        tracing::info!("subscriber installed once");
    }
}
