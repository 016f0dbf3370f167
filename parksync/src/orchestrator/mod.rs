//! Single-item refresh orchestration
//!
//! Resolves the service behind a data kind, asks the rate limiter for a
//! slot, fetches from the upstream provider and writes the result through
//! the artifact cache.
//!
//! ```text
//! refresh_one(entity, kind)
//!   ├─ validate entity code            ─► InvalidRequest
//!   ├─ service = kind.service()
//!   ├─ limiter.try_acquire(service)    ─► RateLimited { retry_after }
//!   ├─ fetcher.fetch(entity, kind)     ─► Upstream
//!   ├─ cache.put(artifact)             ─► Storage (slot stays consumed)
//!   └─ RefreshOutcome { payload, fetched_at, remaining_quota }
//! ```
//!
//! Identical concurrent requests are not coalesced: each call fetches and
//! consumes its own quota slot.

mod types;

pub use types::{RefreshError, RefreshOutcome, RefreshRequest};

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{Artifact, ArtifactCache};
use crate::provider::{DataKind, Fetcher};
use crate::rate_limit::RateLimiter;

/// Coordinates quota, fetch and cache for single-item refreshes.
#[derive(Clone)]
pub struct FetchOrchestrator {
    limiter: Arc<RateLimiter>,
    fetcher: Arc<dyn Fetcher>,
    cache: ArtifactCache,
}

impl FetchOrchestrator {
    pub fn new(limiter: Arc<RateLimiter>, fetcher: Arc<dyn Fetcher>, cache: ArtifactCache) -> Self {
        Self {
            limiter,
            fetcher,
            cache,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Refresh a validated request.
    pub async fn refresh(&self, request: &RefreshRequest) -> Result<RefreshOutcome, RefreshError> {
        self.refresh_one(&request.entity_code, request.data_kind)
            .await
    }

    /// Refresh the cached artifact for one `(entity_code, data_kind)` pair.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` for an empty or malformed entity code
    /// - `RateLimited` when the service's window is exhausted; no fetch is made
    /// - `Upstream` when the fetch fails; the quota slot is consumed
    /// - `Storage` when the artifact cannot be written; the quota slot is consumed
    pub async fn refresh_one(
        &self,
        entity_code: &str,
        data_kind: DataKind,
    ) -> Result<RefreshOutcome, RefreshError> {
        types::validate_entity_code(entity_code)?;
        let service = data_kind.service();

        let admission = self.limiter.try_acquire(service);
        if !admission.admitted {
            debug!(
                entity = %entity_code,
                kind = %data_kind,
                %service,
                retry_after_ms = admission.retry_after.as_millis() as u64,
                "Refresh rate limited"
            );
            return Err(RefreshError::RateLimited {
                service,
                retry_after: admission.retry_after,
            });
        }

        let payload = self
            .fetcher
            .fetch(entity_code, data_kind)
            .await
            .map_err(|source| {
                warn!(
                    entity = %entity_code,
                    kind = %data_kind,
                    %service,
                    error = %source,
                    "Upstream fetch failed"
                );
                RefreshError::Upstream { service, source }
            })?;

        let artifact = Artifact::new(entity_code, data_kind, payload);
        if let Err(e) = self.cache.put(&artifact).await {
            error!(
                entity = %entity_code,
                kind = %data_kind,
                backend = self.cache.backend_name(),
                error = %e,
                "Failed to store artifact"
            );
            return Err(RefreshError::Storage(e));
        }

        info!(
            entity = %entity_code,
            kind = %data_kind,
            %service,
            bytes = artifact.payload.len(),
            remaining = admission.remaining,
            "Artifact refreshed"
        );

        Ok(RefreshOutcome {
            entity_code: artifact.entity_code,
            data_kind,
            service,
            payload: artifact.payload,
            fetched_at: artifact.fetched_at,
            remaining_quota: admission.remaining,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use bytes::Bytes;
    use futures::future::BoxFuture;
    use parking_lot::Mutex;

    use crate::cache::{BoxFuture as CacheFuture, Cache, MemoryCacheProvider, ServiceCacheError};
    use crate::provider::{ProviderError, Service};
    use crate::rate_limit::{QuotaTable, ServiceQuota};

    /// Deterministic fetcher that echoes the pair and can be told to fail.
    #[derive(Default)]
    pub struct FakeFetcher {
        pub calls: AtomicUsize,
        pub log: Mutex<Vec<(String, DataKind)>>,
        pub failing: Mutex<HashSet<(String, DataKind)>>,
    }

    impl FakeFetcher {
        pub fn fail_on(&self, entity_code: &str, kind: DataKind) {
            self.failing.lock().insert((entity_code.to_string(), kind));
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Fetcher for FakeFetcher {
        fn fetch<'a>(
            &'a self,
            entity_code: &'a str,
            kind: DataKind,
        ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.log.lock().push((entity_code.to_string(), kind));
                if self
                    .failing
                    .lock()
                    .contains(&(entity_code.to_string(), kind))
                {
                    return Err(ProviderError::Status {
                        status: 500,
                        url: format!("fake://{}/{}", entity_code, kind),
                    });
                }
                Ok(Bytes::from(format!("{}:{}", entity_code, kind)))
            })
        }
    }

    /// Fetcher that panics on one pair and succeeds on the rest.
    pub struct PanickingFetcher {
        pub entity_code: &'static str,
        pub kind: DataKind,
    }

    impl Fetcher for PanickingFetcher {
        fn fetch<'a>(
            &'a self,
            entity_code: &'a str,
            kind: DataKind,
        ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
            Box::pin(async move {
                if entity_code == self.entity_code && kind == self.kind {
                    panic!("fetcher blew up on {}/{}", entity_code, kind);
                }
                Ok(Bytes::from_static(b"ok"))
            })
        }
    }

    /// Cache whose writes always fail.
    pub struct BrokenCache;

    impl Cache for BrokenCache {
        fn set(&self, _key: &str, _value: Vec<u8>) -> CacheFuture<'_, Result<(), ServiceCacheError>> {
            Box::pin(async {
                Err(ServiceCacheError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )))
            })
        }

        fn get(&self, _key: &str) -> CacheFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>> {
            Box::pin(async { Ok(None) })
        }

        fn contains(&self, _key: &str) -> CacheFuture<'_, Result<bool, ServiceCacheError>> {
            Box::pin(async { Ok(false) })
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn orchestrator(quota: ServiceQuota) -> (FetchOrchestrator, Arc<FakeFetcher>) {
        let fetcher = Arc::new(FakeFetcher::default());
        let orchestrator = FetchOrchestrator::new(
            Arc::new(RateLimiter::new(QuotaTable::uniform(quota))),
            fetcher.clone(),
            ArtifactCache::new(Arc::new(MemoryCacheProvider::default())),
        );
        (orchestrator, fetcher)
    }

    #[tokio::test]
    async fn test_success_writes_through_cache() {
        let (orchestrator, fetcher) = orchestrator(ServiceQuota::new(5, Duration::from_secs(60)));

        let outcome = orchestrator
            .refresh_one("YELL", DataKind::Details)
            .await
            .unwrap();

        assert_eq!(outcome.service, Service::Nps);
        assert_eq!(&outcome.payload[..], b"YELL:details");
        assert_eq!(outcome.remaining_quota, 4);
        assert_eq!(fetcher.call_count(), 1);

        let cached = orchestrator
            .cache()
            .get("YELL", DataKind::Details)
            .await
            .unwrap();
        assert_eq!(cached.payload, outcome.payload);
        assert_eq!(cached.fetched_at, outcome.fetched_at);
    }

    #[tokio::test]
    async fn test_success_lowers_remaining_quota() {
        let (orchestrator, _) = orchestrator(ServiceQuota::new(3, Duration::from_secs(60)));
        let limiter = Arc::clone(orchestrator.limiter());

        for _ in 0..3 {
            let before = limiter.remaining(Service::Nasa);
            let outcome = orchestrator
                .refresh_one("ZION", DataKind::Satellite)
                .await
                .unwrap();
            assert!(outcome.remaining_quota < before);
        }

        let before = limiter.remaining(Service::Nasa);
        let err = orchestrator
            .refresh_one("ZION", DataKind::Satellite)
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(limiter.remaining(Service::Nasa), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_quota_reports_retry_after_within_window() {
        let window = Duration::from_secs(1);
        let (orchestrator, fetcher) = orchestrator(ServiceQuota::new(2, window));

        orchestrator.refresh_one("ENTITY1", DataKind::Images).await.unwrap();
        orchestrator.refresh_one("ENTITY1", DataKind::Images).await.unwrap();

        let mut previous = Duration::MAX;
        for _ in 0..3 {
            match orchestrator.refresh_one("ENTITY1", DataKind::Images).await {
                Err(RefreshError::RateLimited {
                    service,
                    retry_after,
                }) => {
                    assert_eq!(service, Service::Unsplash);
                    assert!(retry_after <= window);
                    assert!(retry_after <= previous);
                    previous = retry_after;
                }
                other => panic!("expected RateLimited, got {:?}", other),
            }
        }
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_entity_consumes_no_quota() {
        let (orchestrator, fetcher) = orchestrator(ServiceQuota::new(1, Duration::from_secs(60)));

        let err = orchestrator
            .refresh_one("", DataKind::Images)
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::InvalidRequest(_)));
        assert_eq!(orchestrator.limiter().remaining(Service::Unsplash), 1);
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_keeps_slot_consumed() {
        let (orchestrator, fetcher) = orchestrator(ServiceQuota::new(2, Duration::from_secs(60)));
        fetcher.fail_on("YELL", DataKind::Alerts);

        let err = orchestrator
            .refresh_one("YELL", DataKind::Alerts)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RefreshError::Upstream {
                service: Service::Nps,
                ..
            }
        ));
        assert_eq!(orchestrator.limiter().remaining(Service::Nps), 1);
        assert!(!orchestrator
            .cache()
            .contains("YELL", DataKind::Alerts)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_storage_failure_is_surfaced_after_fetch() {
        let fetcher = Arc::new(FakeFetcher::default());
        let orchestrator = FetchOrchestrator::new(
            Arc::new(RateLimiter::new(QuotaTable::default())),
            fetcher.clone(),
            ArtifactCache::new(Arc::new(BrokenCache)),
        );

        let err = orchestrator
            .refresh_one("YELL", DataKind::Images)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "storage_error");
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(orchestrator.limiter().remaining(Service::Unsplash), 49);
    }

    #[tokio::test]
    async fn test_repeated_refresh_is_not_deduplicated() {
        let (orchestrator, fetcher) = orchestrator(ServiceQuota::new(10, Duration::from_secs(60)));
        let request = RefreshRequest::new("ACAD", DataKind::Terrain).unwrap();

        let (a, b) = tokio::join!(orchestrator.refresh(&request), orchestrator.refresh(&request));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(fetcher.call_count(), 2);
        assert_eq!(orchestrator.limiter().remaining(Service::Nasa), 8);
    }
}
