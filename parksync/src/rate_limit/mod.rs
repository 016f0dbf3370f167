//! Per-service request quota enforcement.
//!
//! - [`RateLimiter`]: fixed-window admit/deny decisions
//! - [`QuotaTable`] / [`ServiceQuota`]: static quota configuration
//! - [`QuotaStore`]: counter storage seam, [`InMemoryQuotaStore`] by default

mod limiter;
mod quota;
mod store;

pub use limiter::RateLimiter;
pub use quota::{QuotaTable, ServiceQuota, HOURLY};
pub use store::{Admission, InMemoryQuotaStore, QuotaSnapshot, QuotaStore};
