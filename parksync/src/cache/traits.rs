//! Core traits for the byte-level cache.
//!
//! The `Cache` trait provides a domain-agnostic key-value interface. The
//! artifact layer ([`crate::cache::ArtifactCache`]) maps `(entity, kind)`
//! pairs onto it, so any backend can hold artifacts.
//!
//! # Design Principles
//!
//! - **String keys**: `ENTITY/kind`, human-readable in logs and on disk
//! - **Vec<u8> values**: raw bytes, no serialization opinions imposed
//! - **Overwrite semantics**: `set` replaces; nothing is versioned or expired
//! - **Dyn-compatible**: uses `Pin<Box<dyn Future>>` for trait object support

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum ServiceCacheError {
    /// I/O error during cache operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be mapped onto the backend's keyspace.
    #[error("Invalid cache key '{0}'")]
    InvalidKey(String),

    /// Provider-specific error.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Generic cache interface for key-value storage.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Concurrent writes to distinct
/// keys must not interfere; concurrent writes to the same key may race and
/// the last completed write wins.
pub trait Cache: Send + Sync {
    /// Store a value with the given key, replacing any existing value.
    ///
    /// Any namespace the key implies (such as a directory) is created on
    /// demand.
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), ServiceCacheError>>;

    /// Retrieve a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if an error occurs
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>>;

    /// Check if a key exists without retrieving the value.
    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, ServiceCacheError>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
