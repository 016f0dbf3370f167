//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use parksync::app::{AppConfig, ParkSyncApp};
use parksync::catalog::{Entity, EntityCatalog};
use parksync::provider::{DataKind, Fetcher, ProviderError};
use parksync::rate_limit::{QuotaTable, ServiceQuota};
use parksync::refresh::SweepConfig;

/// Fetcher that returns `CODE:kind` and fails for selected pairs.
#[derive(Default)]
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, DataKind)>>,
    failing: Mutex<HashSet<(String, DataKind)>>,
}

impl ScriptedFetcher {
    pub fn fail_on(&self, entity_code: &str, kind: DataKind) {
        self.failing.lock().insert((entity_code.to_string(), kind));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(String, DataKind)> {
        self.seen.lock().clone()
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch<'a>(
        &'a self,
        entity_code: &'a str,
        kind: DataKind,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().push((entity_code.to_string(), kind));
            let key = (entity_code.to_string(), kind);
            if self.failing.lock().contains(&key) {
                return Err(ProviderError::Status {
                    status: 503,
                    url: "https://upstream.invalid".to_string(),
                });
            }
            Ok(Bytes::from(format!("{}:{}", entity_code, kind)))
        })
    }
}

pub fn catalog(codes: &[&str]) -> Arc<EntityCatalog> {
    let entities = codes
        .iter()
        .map(|code| Entity {
            code: code.to_string(),
            name: format!("{} National Park", code),
            latitude: 40.0,
            longitude: -110.0,
        })
        .collect();
    Arc::new(EntityCatalog::new(entities).expect("valid catalog"))
}

pub fn unlimited() -> QuotaTable {
    QuotaTable::uniform(ServiceQuota::new(u32::MAX, Duration::from_secs(3600)))
}

/// Build an app over an in-memory cache and the given fetcher.
pub fn app(
    codes: &[&str],
    quotas: QuotaTable,
    courtesy_delay: Duration,
    fetcher: Arc<ScriptedFetcher>,
) -> Arc<ParkSyncApp> {
    let config = AppConfig::new("unused.json")
        .with_quotas(quotas)
        .with_sweep(SweepConfig::with_courtesy_delay(courtesy_delay));
    Arc::new(ParkSyncApp::with_fetcher(config, catalog(codes), fetcher))
}
