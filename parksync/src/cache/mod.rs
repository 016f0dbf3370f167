//! Artifact cache.
//!
//! Two layers:
//!
//! - [`Cache`]: domain-agnostic byte store with memory and disk providers
//! - [`ArtifactCache`]: typed `(entity, kind)` → [`Artifact`] mapping on top
//!
//! # Example
//!
//! ```ignore
//! use parksync::cache::{ArtifactCache, CacheBackend};
//!
//! let cache = ArtifactCache::new(CacheBackend::Disk { directory }.build());
//! cache.put(&Artifact::new("YELL", DataKind::Details, payload)).await?;
//! let latest = cache.get("YELL", DataKind::Details).await?;
//! ```

mod artifact;
mod providers;
mod traits;

pub use artifact::{Artifact, ArtifactCache, ArtifactError};
pub use providers::{DiskCacheProvider, MemoryCacheProvider};
pub use traits::{BoxFuture, Cache, ServiceCacheError};

use std::path::PathBuf;
use std::sync::Arc;

/// Which cache provider backs the artifact cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// Process memory; contents are lost on exit.
    Memory,
    /// One file per artifact under `directory`.
    Disk { directory: PathBuf },
}

impl CacheBackend {
    /// Create the configured provider.
    pub fn build(&self) -> Arc<dyn Cache> {
        match self {
            CacheBackend::Memory => Arc::new(MemoryCacheProvider::new()),
            CacheBackend::Disk { directory } => Arc::new(DiskCacheProvider::new(directory.clone())),
        }
    }
}
