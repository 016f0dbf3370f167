//! Application bootstrap.
//!
//! `ParkSyncApp` builds every component from an [`AppConfig`] in the right
//! order and owns them for the life of the process. Both the HTTP server
//! and the CLI commands start from here.
//!
//! # Example
//!
//! ```ignore
//! use parksync::app::{AppConfig, ParkSyncApp};
//! use parksync::config::ConfigFile;
//!
//! let config = AppConfig::from_config_file(&ConfigFile::load()?);
//! let app = ParkSyncApp::start(config).await?;
//!
//! let outcome = app.orchestrator().refresh_one("YELL", DataKind::Alerts).await?;
//!
//! app.shutdown().await;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::ParkSyncApp;
pub use config::{AppConfig, ProviderKeys};
pub use error::AppError;
