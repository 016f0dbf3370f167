//! Observable sweep status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::provider::DataKind;

use super::config::MAX_RECORDED_FAILURES;

/// Lifecycle of a sweep.
///
/// `Idle → Running → Completed | Cancelled`. Terminal states are final for
/// that sweep; a new start creates a new sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl SweepState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SweepState::Completed | SweepState::Cancelled)
    }
}

impl fmt::Display for SweepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SweepState::Idle => "idle",
            SweepState::Running => "running",
            SweepState::Completed => "completed",
            SweepState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Position of the next pair to process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepCursor {
    pub entity_index: usize,
    pub kind_index: usize,
}

/// A pair the sweep gave up on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
    pub entity_code: String,
    pub data_kind: DataKind,
    /// Error label, e.g. `upstream_error`.
    pub error: String,
    pub message: String,
}

/// Snapshot of a sweep's progress.
#[derive(Debug, Clone, Serialize)]
pub struct SweepStatus {
    /// Monotonic id of the sweep; 0 when none has run.
    pub sweep_id: u64,
    pub state: SweepState,
    pub cursor: SweepCursor,
    /// Pairs in the matrix (entities × data kinds).
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Times the sweep waited for a quota window to reset.
    pub rate_limited_waits: usize,
    /// Most recent failures, oldest first.
    pub failures: Vec<SweepFailure>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SweepStatus {
    /// Status reported when no sweep has been started.
    pub fn idle() -> Self {
        Self {
            sweep_id: 0,
            state: SweepState::Idle,
            cursor: SweepCursor::default(),
            total: 0,
            succeeded: 0,
            failed: 0,
            rate_limited_waits: 0,
            failures: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub(crate) fn running(sweep_id: u64, total: usize) -> Self {
        Self {
            sweep_id,
            state: SweepState::Running,
            total,
            started_at: Some(Utc::now()),
            ..Self::idle()
        }
    }

    /// Pairs processed so far.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Progress as a fraction from 0.0 to 1.0.
    pub fn progress_fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed() as f64 / self.total as f64
    }

    pub fn is_running(&self) -> bool {
        self.state == SweepState::Running
    }

    pub(crate) fn record_failure(&mut self, failure: SweepFailure) {
        self.failed += 1;
        if self.failures.len() == MAX_RECORDED_FAILURES {
            self.failures.remove(0);
        }
        self.failures.push(failure);
    }

    pub(crate) fn finish(&mut self, state: SweepState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }
}

impl Default for SweepStatus {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(n: usize) -> SweepFailure {
        SweepFailure {
            entity_code: format!("E{}", n),
            data_kind: DataKind::Images,
            error: "upstream_error".to_string(),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_idle_status() {
        let status = SweepStatus::idle();
        assert_eq!(status.state, SweepState::Idle);
        assert_eq!(status.sweep_id, 0);
        assert_eq!(status.progress_fraction(), 1.0);
        assert!(!status.is_running());
    }

    #[test]
    fn test_progress_fraction() {
        let mut status = SweepStatus::running(1, 10);
        assert_eq!(status.progress_fraction(), 0.0);

        status.succeeded = 4;
        status.record_failure(failure(0));
        assert_eq!(status.processed(), 5);
        assert_eq!(status.progress_fraction(), 0.5);
    }

    #[test]
    fn test_failure_list_is_bounded() {
        let mut status = SweepStatus::running(1, 1000);
        for n in 0..MAX_RECORDED_FAILURES + 5 {
            status.record_failure(failure(n));
        }
        assert_eq!(status.failed, MAX_RECORDED_FAILURES + 5);
        assert_eq!(status.failures.len(), MAX_RECORDED_FAILURES);
        assert_eq!(status.failures[0].entity_code, "E5");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SweepState::Idle.is_terminal());
        assert!(!SweepState::Running.is_terminal());
        assert!(SweepState::Completed.is_terminal());
        assert!(SweepState::Cancelled.is_terminal());
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let json = serde_json::to_string(&SweepState::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
