//! Fixed-window rate limiter.
//!
//! # Algorithm
//!
//! ```text
//! admit(service):
//!   window unseen or now >= reset_at  ->  count = 0, reset_at = now + window
//!   count < max                       ->  count += 1, admit
//!   otherwise                         ->  deny, retry after (reset_at - now)
//! ```
//!
//! Requests are counted per fixed window, not a sliding one: up to `2 * max`
//! requests can land within one window length when a burst straddles a
//! window boundary.
//!
//! Counters are not persisted. A restart starts every service with a fresh
//! window, and a process never sees the requests another process made.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::quota::{QuotaTable, ServiceQuota};
use super::store::{Admission, InMemoryQuotaStore, QuotaSnapshot, QuotaStore};
use crate::provider::Service;

/// Per-service fixed-window rate limiter.
///
/// Cheap to share behind an `Arc`; all state lives in the injected
/// [`QuotaStore`].
pub struct RateLimiter {
    quotas: QuotaTable,
    store: Arc<dyn QuotaStore>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("quotas", &self.quotas)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    /// Create a limiter with a process-local store.
    pub fn new(quotas: QuotaTable) -> Self {
        Self::with_store(quotas, Arc::new(InMemoryQuotaStore::new()))
    }

    /// Create a limiter backed by the given store.
    pub fn with_store(quotas: QuotaTable, store: Arc<dyn QuotaStore>) -> Self {
        Self { quotas, store }
    }

    /// Admit or deny one request to `service`, consuming a slot on admit.
    pub fn admit(&self, service: Service) -> bool {
        self.try_acquire(service).admitted
    }

    /// Admit or deny one request and report the window state observed by
    /// that same atomic step.
    pub fn try_acquire(&self, service: Service) -> Admission {
        let admission = self
            .store
            .try_acquire(service, self.quotas.get(service), Instant::now());

        if admission.admitted {
            debug!(%service, remaining = admission.remaining, "Request admitted");
        } else {
            debug!(
                %service,
                retry_after_ms = admission.retry_after.as_millis() as u64,
                "Request denied: quota exhausted"
            );
        }
        admission
    }

    /// Time until the current window of `service` resets.
    ///
    /// Zero when no window is open, including when the last window has
    /// elapsed and the next request will open a fresh one.
    pub fn time_until_reset(&self, service: Service) -> Duration {
        self.snapshot_for(service).resets_in
    }

    /// Requests left in the current window of `service`.
    pub fn remaining(&self, service: Service) -> u32 {
        self.snapshot_for(service).remaining
    }

    pub fn quota(&self, service: Service) -> ServiceQuota {
        self.quotas.get(service)
    }

    /// Usage of one service.
    pub fn snapshot_for(&self, service: Service) -> QuotaSnapshot {
        self.store
            .snapshot(service, self.quotas.get(service), Instant::now())
    }

    /// Usage of every service, in declaration order.
    pub fn snapshot(&self) -> Vec<QuotaSnapshot> {
        Service::ALL
            .into_iter()
            .map(|service| self.snapshot_for(service))
            .collect()
    }
}
