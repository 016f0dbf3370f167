//! In-memory cache provider using moka.
//!
//! Lock-free reads and concurrent writes make moka safe to share between
//! foreground requests and the refresh sweep. The cache is unbounded: entries
//! are only ever replaced, never evicted.

use moka::future::Cache as MokaCache;

use crate::cache::traits::{BoxFuture, Cache, ServiceCacheError};

/// In-memory cache provider using moka.
pub struct MemoryCacheProvider {
    cache: MokaCache<String, Vec<u8>>,
}

impl MemoryCacheProvider {
    /// Create a new, unbounded memory cache provider.
    pub fn new() -> Self {
        Self {
            cache: MokaCache::builder().build(),
        }
    }

    /// Number of entries (approximate until pending tasks run).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Run moka's pending maintenance so counts are exact.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for MemoryCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache for MemoryCacheProvider {
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        let key = key.to_string();
        Box::pin(async move {
            self.cache.insert(key, value).await;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.get(&key).await) })
    }

    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, ServiceCacheError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.contains_key(&key)) })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
