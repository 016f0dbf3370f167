//! Shared command setup: config, logging, runtime and application.

use std::future::Future;
use std::sync::Arc;

use parksync::app::{AppConfig, ParkSyncApp};
use parksync::config::ConfigFile;
use parksync::logging::{init_logging, LoggingConfig, WorkerGuard};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Owns everything a command needs before it can do real work.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    // Flushes the log file on drop.
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    /// Load config, initialize logging and build a multi-threaded runtime.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let guard = init_logging(&LoggingConfig::from(&config.logging))?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        Ok(Self {
            config,
            runtime,
            _log_guard: guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = parksync::VERSION,
            command,
            catalog = %self.config.refresh.catalog.display(),
            cache = %self.config.cache.backend,
            "ParkSync starting"
        );
    }

    /// Start the application from the loaded config.
    pub fn start_app(&self) -> Result<Arc<ParkSyncApp>, CliError> {
        let config = AppConfig::from_config_file(&self.config);
        let app = self.runtime.block_on(ParkSyncApp::start(config))?;
        Ok(Arc::new(app))
    }

    /// Run a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
