//! Progressive background refresh.
//!
//! A sweep walks the entity catalog × every data kind and refreshes each
//! pair through the [`FetchOrchestrator`](crate::orchestrator::FetchOrchestrator),
//! waiting out rate-limit windows instead of failing. `RefreshController`
//! keeps at most one sweep running per process.
//!
//! # Example
//!
//! ```ignore
//! let controller = RefreshController::new(orchestrator, catalog, SweepConfig::default());
//!
//! let handle = controller.start();
//! let status = handle.status();
//! println!("{}/{} pairs", status.processed(), status.total);
//!
//! handle.cancel();
//! let final_status = handle.wait().await;
//! ```

mod config;
mod context;
mod controller;
mod status;

pub use config::{SweepConfig, DEFAULT_COURTESY_DELAY, MAX_RECORDED_FAILURES};
pub use context::SweepHandle;
pub use controller::RefreshController;
pub use status::{SweepCursor, SweepFailure, SweepState, SweepStatus};
