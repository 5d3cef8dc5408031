use anyhow::Context;
use std::{
    fs,
    path::Path,
    time::{Duration, SystemTime},
};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Keeps the file writer flushing until dropped
#[allow(dead_code)]
pub struct LoggerGuard(WorkerGuard);

pub fn init_logging(
    log_dir: impl AsRef<Path>,
    prefix: &str,
    level: &str,
    max_age: Duration,
) -> anyhow::Result<LoggerGuard> {
    let log_dir = log_dir.as_ref();

    let level = match level {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            "info"
        }
    };

    let builder = EnvFilter::builder().with_default_directive(level.parse()?);
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();
    let console_filter = builder.clone().parse_lossy(&rust_log);
    let file_filter = builder.parse_lossy(&rust_log);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create file appender in {}", log_dir.display()))?;
    let (non_blocking, guard) = NonBlocking::new(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(file_filter);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    // One-shot run: clean once instead of on an interval
    match cleanup_old_logs(log_dir, prefix, max_age) {
        Ok(0) => {}
        Ok(n) => tracing::info!("Deleted {} old log file(s)", n),
        Err(e) => tracing::warn!("Failed to delete old log files: {}", e),
    }

    Ok(LoggerGuard(guard))
}

fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with(prefix) || !file_name.ends_with(".log") {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_only_touches_own_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("repeater-ingest.2026-01-01.log"), "old").unwrap();
        fs::write(dir.path().join("other.2026-01-01.log"), "keep").unwrap();
        fs::write(dir.path().join("repeater-ingest.txt"), "keep").unwrap();

        let week_ago = SystemTime::now() - Duration::from_secs(7 * 24 * 60 * 60);
        for name in ["repeater-ingest.2026-01-01.log", "other.2026-01-01.log", "repeater-ingest.txt"] {
            fs::File::options()
                .write(true)
                .open(dir.path().join(name))
                .unwrap()
                .set_modified(week_ago)
                .unwrap();
        }

        let max_age = Duration::from_secs(3 * 24 * 60 * 60);
        let removed = cleanup_old_logs(dir.path(), "repeater-ingest", max_age).unwrap();
        assert_eq!(removed, 1);
        assert!(!dir.path().join("repeater-ingest.2026-01-01.log").exists());
        assert!(dir.path().join("other.2026-01-01.log").exists());
        assert!(dir.path().join("repeater-ingest.txt").exists());
    }

    #[test]
    fn test_cleanup_keeps_fresh_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("repeater-ingest.log"), "fresh").unwrap();

        let max_age = Duration::from_secs(60 * 60);
        assert_eq!(cleanup_old_logs(dir.path(), "repeater-ingest", max_age).unwrap(), 0);
    }
}
