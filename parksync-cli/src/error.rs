//! CLI error type.

use std::fmt;

use parksync::app::AppError;
use parksync::cache::ArtifactError;
use parksync::config::ConfigError;
use parksync::logging::LoggingError;
use parksync::orchestrator::RefreshError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid configuration or arguments.
    Config(String),

    /// Reading or writing the config file failed.
    ConfigFile(ConfigError),

    /// Logging could not be initialized.
    Logging(LoggingError),

    /// The application failed to start.
    App(AppError),

    /// The Tokio runtime could not be created.
    Runtime(String),

    /// A refresh failed.
    Refresh(RefreshError),

    /// Reading a cached artifact failed.
    Artifact(ArtifactError),

    /// The HTTP server failed.
    Serve(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
            CliError::Refresh(e) => write!(f, "Refresh failed: {}", e),
            CliError::Artifact(e) => write!(f, "{}", e),
            CliError::Serve(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::App(e) => Some(e),
            CliError::Refresh(e) => Some(e),
            CliError::Artifact(e) => Some(e),
            CliError::Config(_) | CliError::Runtime(_) | CliError::Serve(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<RefreshError> for CliError {
    fn from(e: RefreshError) -> Self {
        CliError::Refresh(e)
    }
}

impl From<ArtifactError> for CliError {
    fn from(e: ArtifactError) -> Self {
        CliError::Artifact(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::Config("bad bind address".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad bind address");
    }

    #[test]
    fn test_refresh_error_converts() {
        let err: CliError = RefreshError::InvalidRequest("empty".to_string()).into();
        assert!(err.to_string().starts_with("Refresh failed"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
