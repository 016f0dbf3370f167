//! Single-instance sweep controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::catalog::EntityCatalog;
use crate::orchestrator::FetchOrchestrator;

use super::config::SweepConfig;
use super::context::{SweepContext, SweepHandle};
use super::status::SweepStatus;

/// Owns the process-wide sweep slot.
///
/// At most one sweep runs at a time. Starting while one is running returns
/// the running sweep's handle instead of launching another.
pub struct RefreshController {
    orchestrator: FetchOrchestrator,
    catalog: Arc<EntityCatalog>,
    config: SweepConfig,
    active: Mutex<Option<SweepHandle>>,
    next_id: AtomicU64,
}

impl RefreshController {
    pub fn new(
        orchestrator: FetchOrchestrator,
        catalog: Arc<EntityCatalog>,
        config: SweepConfig,
    ) -> Self {
        Self {
            orchestrator,
            catalog,
            config,
            active: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn catalog(&self) -> &Arc<EntityCatalog> {
        &self.catalog
    }

    /// Start a sweep over the whole catalog, or return the running one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> SweepHandle {
        let mut active = self.active.lock();
        if let Some(handle) = active.as_ref() {
            if handle.is_running() {
                info!(
                    sweep_id = handle.sweep_id(),
                    "Sweep already running, not starting another"
                );
                return handle.clone();
            }
        }

        let sweep_id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let handle = SweepContext::start(
            sweep_id,
            self.orchestrator.clone(),
            self.catalog.codes(),
            self.config.clone(),
        );
        *active = Some(handle.clone());
        handle
    }

    /// Handle of the most recent sweep, if any.
    pub fn current(&self) -> Option<SweepHandle> {
        self.active.lock().clone()
    }

    /// Status of the most recent sweep, or `Idle` if none has run.
    pub fn status(&self) -> SweepStatus {
        self.current()
            .map(|h| h.status())
            .unwrap_or_else(SweepStatus::idle)
    }

    /// Request cancellation of the running sweep, if any.
    ///
    /// The returned status may still read `Running`; the sweep stops at its
    /// next suspension point.
    pub fn cancel(&self) -> SweepStatus {
        match self.current() {
            Some(handle) => {
                if handle.is_running() {
                    handle.cancel();
                }
                handle.status()
            }
            None => SweepStatus::idle(),
        }
    }
}
