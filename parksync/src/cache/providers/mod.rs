//! Cache provider implementations.
//!
//! Each provider implements the `Cache` trait.
//!
//! # Available Providers
//!
//! - [`MemoryCacheProvider`]: in-memory cache using moka
//! - [`DiskCacheProvider`]: one file per key under a root directory
//!
//! Use [`CacheBackend::build`](crate::cache::CacheBackend::build) to create
//! the configured provider.

mod disk;
mod memory;

pub use disk::DiskCacheProvider;
pub use memory::MemoryCacheProvider;
