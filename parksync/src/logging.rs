//! Tracing subscriber setup.
//!
//! Logs go to stderr and, when a directory is configured, to a daily rolling
//! file. `RUST_LOG` overrides the configured level.

use std::path::PathBuf;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// File name prefix for rolling log files.
pub const LOG_FILE_PREFIX: &str = "parksync.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("Failed to create log directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging already initialized")]
    AlreadyInitialized,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `parksync=debug`.
    pub level: String,
    /// Directory for daily log files; stderr only when `None`.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl From<&LoggingSettings> for LoggingConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            level: settings.level.clone(),
            directory: settings.directory.clone(),
        }
    }
}

impl LoggingConfig {
    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level).map_err(|_| LoggingError::InvalidFilter(self.level.clone()))
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; hold it for the life
/// of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = config.filter()?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::new(Rfc3339))
        .with_target(true);

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::Directory {
                path: dir.display().to_string(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::new(Rfc3339));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_from_settings() {
        let settings = LoggingSettings {
            level: "parksync=debug".to_string(),
            directory: Some(PathBuf::from("/tmp/logs")),
        };
        let config = LoggingConfig::from(&settings);
        assert_eq!(config.level, "parksync=debug");
        assert_eq!(config.directory, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "parksync=notalevel".to_string(),
            directory: None,
        };
        assert!(matches!(
            config.filter(),
            Err(LoggingError::InvalidFilter(_))
        ));
    }
}
