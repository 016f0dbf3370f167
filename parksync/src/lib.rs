//! ParkSync - rate-governed data refresh for national park data
//!
//! This library mediates access to several upstream data providers, each
//! with its own request quota, and keeps a cache of the latest payload for
//! every `(park, data kind)` pair:
//!
//! - [`rate_limit`]: fixed-window quota per upstream service
//! - [`cache`]: artifact storage over memory or disk
//! - [`orchestrator`]: single-item refresh through limiter, provider and cache
//! - [`refresh`]: cancellable background sweep over the whole catalog
//! - [`api`]: HTTP surface over all of the above

pub mod api;
pub mod app;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod orchestrator;
pub mod provider;
pub mod rate_limit;
pub mod refresh;

/// Crate version, for banners and the upstream user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
