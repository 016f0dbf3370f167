//! Application configuration for ParkSyncApp.
//!
//! `AppConfig` combines everything needed to bootstrap the application. It
//! is usually derived from the user's [`ConfigFile`]; API keys missing from
//! the file fall back to the `UNSPLASH_ACCESS_KEY`, `NPS_API_KEY` and
//! `NASA_API_KEY` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheBackend;
use crate::config::{CacheBackendKind, ConfigFile};
use crate::provider::{Service, DEFAULT_TIMEOUT_SECS};
use crate::rate_limit::{QuotaTable, ServiceQuota};
use crate::refresh::SweepConfig;

/// Upstream credentials and HTTP settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderKeys {
    pub unsplash_access_key: Option<String>,
    pub nps_api_key: Option<String>,
    pub nasa_api_key: Option<String>,
}

impl ProviderKeys {
    /// Fill unset keys from the environment.
    pub fn with_env_fallback(mut self) -> Self {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        self.unsplash_access_key = self
            .unsplash_access_key
            .or_else(|| env("UNSPLASH_ACCESS_KEY"));
        self.nps_api_key = self.nps_api_key.or_else(|| env("NPS_API_KEY"));
        self.nasa_api_key = self.nasa_api_key.or_else(|| env("NASA_API_KEY"));
        self
    }
}

/// Top-level configuration passed to `ParkSyncApp::start()`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Artifact cache backend.
    pub cache: CacheBackend,

    /// Per-service quota table.
    pub quotas: QuotaTable,

    /// Upstream credentials.
    pub keys: ProviderKeys,

    /// Upstream HTTP timeout in seconds.
    pub timeout_secs: u64,

    /// Path of the entity catalog JSON.
    pub catalog_path: PathBuf,

    /// Sweep pacing.
    pub sweep: SweepConfig,
}

impl AppConfig {
    /// Create a config with default quotas and an in-memory cache.
    pub fn new(catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            cache: CacheBackend::Memory,
            quotas: QuotaTable::default(),
            keys: ProviderKeys::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            catalog_path: catalog_path.into(),
            sweep: SweepConfig::default(),
        }
    }

    pub fn with_cache(mut self, cache: CacheBackend) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_quotas(mut self, quotas: QuotaTable) -> Self {
        self.quotas = quotas;
        self
    }

    pub fn with_keys(mut self, keys: ProviderKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_sweep(mut self, sweep: SweepConfig) -> Self {
        self.sweep = sweep;
        self
    }

    /// Derive the application config from the user's config file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let cache = match config.cache.backend {
            CacheBackendKind::Disk => CacheBackend::Disk {
                directory: config.cache.directory.clone(),
            },
            CacheBackendKind::Memory => CacheBackend::Memory,
        };

        let quotas = Service::ALL
            .into_iter()
            .fold(QuotaTable::default(), |table, service| {
                let defaults = ServiceQuota::default_for(service);
                let overrides = config.quota.get(service);
                let quota = ServiceQuota::new(
                    overrides.max_requests.unwrap_or(defaults.max_requests),
                    overrides
                        .window_secs
                        .map(Duration::from_secs)
                        .unwrap_or(defaults.window),
                );
                table.with_quota(service, quota)
            });

        let keys = ProviderKeys {
            unsplash_access_key: config.providers.unsplash_access_key.clone(),
            nps_api_key: config.providers.nps_api_key.clone(),
            nasa_api_key: config.providers.nasa_api_key.clone(),
        }
        .with_env_fallback();

        Self {
            cache,
            quotas,
            keys,
            timeout_secs: config.providers.timeout_secs,
            catalog_path: config.refresh.catalog.clone(),
            sweep: SweepConfig::with_courtesy_delay(Duration::from_millis(
                config.refresh.courtesy_delay_ms,
            )),
        }
    }
}
