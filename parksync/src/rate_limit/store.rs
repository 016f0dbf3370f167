//! Quota counting stores.
//!
//! A [`QuotaStore`] owns the fixed-window counters for every service. The
//! only mutating operation is [`QuotaStore::try_acquire`], which performs
//! the window roll, the check and the increment as one atomic step per
//! service. Nothing outside the store may read-then-write a counter.
//!
//! [`InMemoryQuotaStore`] is process-local: several processes sharing the
//! same upstream keys will each grant the full quota. A shared store with
//! atomic increment-with-expiry semantics can be injected instead.

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::time::Instant;

use super::quota::{duration_secs, ServiceQuota};
use crate::provider::Service;

/// Result of one admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the request may proceed.
    pub admitted: bool,
    /// Requests left in the current window after this attempt.
    pub remaining: u32,
    /// Time until the current window resets (zero when admitted).
    pub retry_after: Duration,
}

/// Point-in-time usage of one service's quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSnapshot {
    pub service: Service,
    pub max_requests: u32,
    pub used: u32,
    pub remaining: u32,
    #[serde(with = "duration_secs")]
    pub resets_in: Duration,
    #[serde(with = "duration_secs")]
    pub window: Duration,
}

/// Storage for fixed-window quota counters.
pub trait QuotaStore: Send + Sync {
    /// Atomically roll the window if it has elapsed, then admit and count
    /// the request if the window has capacity.
    fn try_acquire(&self, service: Service, quota: ServiceQuota, now: Instant) -> Admission;

    /// Read the current usage without consuming quota.
    fn snapshot(&self, service: Service, quota: ServiceQuota, now: Instant) -> QuotaSnapshot;
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u32,
    reset_at: Instant,
}

impl WindowState {
    fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: now + window,
        }
    }

    fn is_elapsed(&self, now: Instant) -> bool {
        now >= self.reset_at
    }
}

/// Process-local quota store backed by a concurrent map.
///
/// Each service's counter lives in its own map entry and is mutated only
/// while the entry guard is held.
#[derive(Debug, Default)]
pub struct InMemoryQuotaStore {
    windows: DashMap<Service, WindowState>,
}

impl InMemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuotaStore for InMemoryQuotaStore {
    fn try_acquire(&self, service: Service, quota: ServiceQuota, now: Instant) -> Admission {
        let mut entry = self
            .windows
            .entry(service)
            .or_insert_with(|| WindowState::open(now, quota.window));
        let state = entry.value_mut();

        if state.is_elapsed(now) {
            *state = WindowState::open(now, quota.window);
        }

        if state.count < quota.max_requests {
            state.count += 1;
            Admission {
                admitted: true,
                remaining: quota.max_requests - state.count,
                retry_after: Duration::ZERO,
            }
        } else {
            Admission {
                admitted: false,
                remaining: 0,
                retry_after: state.reset_at.saturating_duration_since(now),
            }
        }
    }

    fn snapshot(&self, service: Service, quota: ServiceQuota, now: Instant) -> QuotaSnapshot {
        let (used, resets_in) = match self.windows.get(&service) {
            Some(state) if !state.is_elapsed(now) => (
                state.count.min(quota.max_requests),
                state.reset_at.saturating_duration_since(now),
            ),
            _ => (0, Duration::ZERO),
        };

        QuotaSnapshot {
            service,
            max_requests: quota.max_requests,
            used,
            remaining: quota.max_requests - used,
            resets_in,
            window: quota.window,
        }
    }
}
