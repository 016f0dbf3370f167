//! Sweep configuration.

use std::time::Duration;

/// Default pause between successful fetches in a sweep.
pub const DEFAULT_COURTESY_DELAY: Duration = Duration::from_secs(2);

/// Maximum number of failures kept in a sweep's status.
///
/// Failures beyond this are still counted.
pub const MAX_RECORDED_FAILURES: usize = 100;

/// Configuration for a progressive refresh sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Pause after each successful refresh, on top of the rate limiter.
    pub courtesy_delay: Duration,
}

impl SweepConfig {
    pub fn with_courtesy_delay(courtesy_delay: Duration) -> Self {
        Self { courtesy_delay }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            courtesy_delay: DEFAULT_COURTESY_DELAY,
        }
    }
}
