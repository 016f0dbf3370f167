//! Sweep execution context.
//!
//! - `SweepContext` - internal context that runs as a self-driving tokio task
//! - `SweepHandle` - lightweight handle to query status, cancel, or wait
//!
//! The sweep walks entities in catalog order and, for each, every data kind
//! in declared order. It calls the orchestrator one pair at a time:
//!
//! - `RateLimited` suspends for `retry_after` and retries the same pair
//! - success advances the cursor, then suspends for the courtesy delay
//! - any other error is recorded and the cursor advances
//!
//! Both suspensions race against the cancellation token. A fetch already in
//! flight when cancellation is requested finishes and is recorded; the sweep
//! stops before the next pair.
//!
//! The sweep task is joined by a supervisor. If it panics, the pair under
//! the cursor is recorded as failed, the sweep ends `Cancelled`, and waiters
//! are released so the controller can start a new one.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::orchestrator::{FetchOrchestrator, RefreshError};
use crate::provider::DataKind;

use super::config::SweepConfig;
use super::status::{SweepCursor, SweepFailure, SweepState, SweepStatus};

/// Handle to a sweep.
///
/// Cheap to clone; every clone observes the same sweep.
#[derive(Clone)]
pub struct SweepHandle {
    status: Arc<Mutex<SweepStatus>>,
    cancellation: CancellationToken,
    done: CancellationToken,
}

impl SweepHandle {
    /// Snapshot of the current status.
    pub fn status(&self) -> SweepStatus {
        self.status.lock().clone()
    }

    pub fn sweep_id(&self) -> u64 {
        self.status.lock().sweep_id
    }

    pub fn is_running(&self) -> bool {
        self.status.lock().is_running()
    }

    /// Request cancellation.
    ///
    /// Cooperative: the sweep stops at its next suspension or loop boundary.
    pub fn cancel(&self) {
        info!(sweep_id = self.sweep_id(), "Sweep cancellation requested");
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Wait until the sweep reaches a terminal state and return its status.
    pub async fn wait(&self) -> SweepStatus {
        self.done.cancelled().await;
        self.status()
    }
}

/// Internal context that drives a sweep.
pub(crate) struct SweepContext {
    orchestrator: FetchOrchestrator,
    entities: Vec<String>,
    config: SweepConfig,
    status: Arc<Mutex<SweepStatus>>,
    cancellation: CancellationToken,
}

impl SweepContext {
    /// Spawn a sweep over `entities` × every data kind and return its handle.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn start(
        sweep_id: u64,
        orchestrator: FetchOrchestrator,
        entities: Vec<String>,
        config: SweepConfig,
    ) -> SweepHandle {
        let total = entities.len() * DataKind::ALL.len();
        let status = Arc::new(Mutex::new(SweepStatus::running(sweep_id, total)));
        let cancellation = CancellationToken::new();
        let done = CancellationToken::new();

        let handle = SweepHandle {
            status: Arc::clone(&status),
            cancellation: cancellation.clone(),
            done: done.clone(),
        };

        let context = Self {
            orchestrator,
            entities: entities.clone(),
            config,
            status: Arc::clone(&status),
            cancellation,
        };

        info!(
            sweep_id,
            entities = context.entities.len(),
            total,
            courtesy_delay_ms = context.config.courtesy_delay.as_millis() as u64,
            "Starting refresh sweep"
        );
        let task = tokio::spawn(context.run());
        tokio::spawn(supervise(task, status, entities, done));

        handle
    }

    /// Main execution loop.
    async fn run(self) {
        let kinds = DataKind::ALL;
        let last_entity = self.entities.len().saturating_sub(1);

        for (entity_index, entity_code) in self.entities.iter().enumerate() {
            let mut kind_index = 0;

            while kind_index < kinds.len() {
                if self.cancellation.is_cancelled() {
                    self.finish(SweepState::Cancelled);
                    return;
                }

                let data_kind = kinds[kind_index];
                match self.orchestrator.refresh_one(entity_code, data_kind).await {
                    Ok(outcome) => {
                        debug!(
                            entity = %entity_code,
                            kind = %data_kind,
                            remaining = outcome.remaining_quota,
                            "Sweep refreshed pair"
                        );
                        kind_index += 1;
                        self.advance(entity_index, kind_index, |s| s.succeeded += 1);

                        let is_last = entity_index == last_entity && kind_index == kinds.len();
                        if !is_last && !self.pause(self.config.courtesy_delay).await {
                            self.finish(SweepState::Cancelled);
                            return;
                        }
                    }
                    Err(RefreshError::RateLimited {
                        service,
                        retry_after,
                    }) => {
                        if self.orchestrator.limiter().quota(service).max_requests == 0 {
                            warn!(
                                entity = %entity_code,
                                kind = %data_kind,
                                %service,
                                "Sweep skipping pair: quota allows no requests"
                            );
                            kind_index += 1;
                            let failure = SweepFailure {
                                entity_code: entity_code.clone(),
                                data_kind,
                                error: "rate_limited".to_string(),
                                message: format!("quota for {} allows no requests", service),
                            };
                            self.advance(entity_index, kind_index, |s| s.record_failure(failure));
                            continue;
                        }

                        info!(
                            entity = %entity_code,
                            kind = %data_kind,
                            %service,
                            retry_after_ms = retry_after.as_millis() as u64,
                            "Sweep waiting for quota reset"
                        );
                        self.status.lock().rate_limited_waits += 1;
                        if !self.pause(retry_after).await {
                            self.finish(SweepState::Cancelled);
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(
                            entity = %entity_code,
                            kind = %data_kind,
                            error = %e,
                            "Sweep skipping pair"
                        );
                        kind_index += 1;
                        let failure = SweepFailure {
                            entity_code: entity_code.clone(),
                            data_kind,
                            error: e.kind().to_string(),
                            message: e.public_message(),
                        };
                        self.advance(entity_index, kind_index, |s| s.record_failure(failure));
                    }
                }
            }
        }

        self.finish(SweepState::Completed);
    }

    /// Sleep for `duration` unless cancelled first. Returns `false` on cancel.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancellation.is_cancelled();
        }
        tokio::select! {
            biased;

            _ = self.cancellation.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    /// Record a processed pair and move the cursor past it.
    fn advance(&self, entity_index: usize, kind_index: usize, record: impl FnOnce(&mut SweepStatus)) {
        let mut s = self.status.lock();
        record(&mut s);
        s.cursor = if kind_index >= DataKind::ALL.len() {
            SweepCursor {
                entity_index: entity_index + 1,
                kind_index: 0,
            }
        } else {
            SweepCursor {
                entity_index,
                kind_index,
            }
        };
    }

    fn finish(&self, state: SweepState) {
        let mut s = self.status.lock();
        s.finish(state);
        info!(
            sweep_id = s.sweep_id,
            state = %state,
            succeeded = s.succeeded,
            failed = s.failed,
            rate_limited_waits = s.rate_limited_waits,
            total = s.total,
            "Refresh sweep finished"
        );
    }
}

/// Join the sweep task and release waiters however it ended.
async fn supervise(
    task: JoinHandle<()>,
    status: Arc<Mutex<SweepStatus>>,
    entities: Vec<String>,
    done: CancellationToken,
) {
    if let Err(e) = task.await {
        let mut s = status.lock();
        error!(sweep_id = s.sweep_id, error = %e, "Refresh sweep task aborted");

        if !s.state.is_terminal() {
            let cursor = s.cursor;
            if let (Some(entity_code), Some(&data_kind)) = (
                entities.get(cursor.entity_index),
                DataKind::ALL.get(cursor.kind_index),
            ) {
                s.record_failure(SweepFailure {
                    entity_code: entity_code.clone(),
                    data_kind,
                    error: "internal_error".to_string(),
                    message: "internal error".to_string(),
                });
            }
            s.finish(SweepState::Cancelled);
        }
    }
    done.cancel();
}
