//! Application bootstrap implementation.
//!
//! Wires the components in dependency order:
//!
//! ```text
//! catalog ──┬──► providers ──► ProviderRouter (Fetcher)
//!           │                          │
//! quotas ───┼──► RateLimiter ──────────┤
//!           │                          ▼
//! cache ────┴──► ArtifactCache ──► FetchOrchestrator ──► RefreshController
//! ```

use std::sync::Arc;

use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::cache::ArtifactCache;
use crate::catalog::EntityCatalog;
use crate::orchestrator::FetchOrchestrator;
use crate::provider::{
    AsyncHttpClient, Fetcher, NasaProvider, NpsProvider, ProviderRouter, ReqwestClient,
    UnsplashProvider,
};
use crate::rate_limit::RateLimiter;
use crate::refresh::RefreshController;

/// A fully wired parksync application.
///
/// Cheap to share: every component is reference counted.
pub struct ParkSyncApp {
    catalog: Arc<EntityCatalog>,
    orchestrator: FetchOrchestrator,
    controller: Arc<RefreshController>,
}

impl ParkSyncApp {
    /// Start the application with the given configuration.
    ///
    /// Loads the entity catalog and builds the upstream HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the HTTP client
    /// cannot be created.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let catalog = Arc::new(EntityCatalog::load(&config.catalog_path)?);
        let client: Arc<dyn AsyncHttpClient> = Arc::new(
            ReqwestClient::with_timeout(config.timeout_secs).map_err(AppError::HttpClient)?,
        );
        let router = ProviderRouter::new(client)
            .with_provider(UnsplashProvider::new(
                config.keys.unsplash_access_key.clone(),
                Arc::clone(&catalog),
            ))
            .with_provider(NpsProvider::new(config.keys.nps_api_key.clone()))
            .with_provider(NasaProvider::new(
                config.keys.nasa_api_key.clone(),
                Arc::clone(&catalog),
            ));

        Ok(Self::with_fetcher(config, catalog, Arc::new(router)))
    }

    /// Assemble the application around an existing catalog and fetcher.
    ///
    /// Used by `start()` and by tests that substitute a fake fetcher.
    pub fn with_fetcher(
        config: AppConfig,
        catalog: Arc<EntityCatalog>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.quotas.clone()));
        let cache = ArtifactCache::new(config.cache.build());
        let orchestrator = FetchOrchestrator::new(limiter, fetcher, cache);
        let controller = Arc::new(RefreshController::new(
            orchestrator.clone(),
            Arc::clone(&catalog),
            config.sweep.clone(),
        ));

        info!(
            entities = catalog.len(),
            cache = orchestrator.cache().backend_name(),
            courtesy_delay_ms = config.sweep.courtesy_delay.as_millis() as u64,
            "ParkSync application started"
        );

        Self {
            catalog,
            orchestrator,
            controller,
        }
    }

    pub fn catalog(&self) -> &Arc<EntityCatalog> {
        &self.catalog
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        self.orchestrator.limiter()
    }

    pub fn cache(&self) -> &ArtifactCache {
        self.orchestrator.cache()
    }

    pub fn controller(&self) -> &Arc<RefreshController> {
        &self.controller
    }

    /// Cancel any running sweep and wait for it to stop.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.controller.current() {
            if handle.is_running() {
                info!("Cancelling refresh sweep for shutdown");
                handle.cancel();
                handle.wait().await;
            }
        }
        info!("ParkSync application stopped");
    }
}
