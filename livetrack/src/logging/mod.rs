//! Logging setup.
//!
//! Installs a `tracing` subscriber writing RFC 3339 local-time records to
//! stdout and, optionally, to a file through a non-blocking appender.
//! `RUST_LOG` takes precedence over the configured level.

use std::path::{Path, PathBuf};

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `livetrack=debug`.
    pub level: String,
    /// Also write records to this file.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{0}'")]
    Filter(String),

    #[error("Invalid log file path: {0}")]
    FilePath(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

/// Keeps the file writer flushing; drop it only at shutdown.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&config.level)?;
    let timer = OffsetTime::new(local_offset(), Rfc3339);

    let stdout = fmt::layer().with_timer(timer.clone()).with_target(false);

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let (dir, name) = split_path(path)?;
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_timer(timer)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|_| LoggingError::Filter(level.to_string()))
}

/// Local offset, falling back to UTC when it cannot be determined.
fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn split_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr), LoggingError> {
    let name = path
        .file_name()
        .ok_or_else(|| LoggingError::FilePath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new("debug").with_file("/tmp/livetrack.log");
        assert_eq!(config.level, "debug");
        assert_eq!(config.file, Some(PathBuf::from("/tmp/livetrack.log")));
    }

    #[test]
    fn test_split_path() {
        let (dir, name) = split_path(Path::new("logs/livetrack.log")).unwrap();
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(name, "livetrack.log");

        let (dir, _) = split_path(Path::new("livetrack.log")).unwrap();
        assert_eq!(dir, Path::new("."));

        assert!(matches!(
            split_path(Path::new("/")),
            Err(LoggingError::FilePath(_))
        ));
    }

    #[test]
    fn test_invalid_filter() {
        // Only meaningful when RUST_LOG does not override the level.
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(matches!(
                build_filter("livetrack=notalevel"),
                Err(LoggingError::Filter(_))
            ));
        }
    }
}
