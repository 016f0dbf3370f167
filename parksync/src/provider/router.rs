//! Dispatch of fetches to per-service providers.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use tracing::debug;

use super::http::{AsyncHttpClient, HttpRequest};
use super::types::{DataKind, Fetcher, ProviderError, Service};

/// Request builder for a single upstream service.
///
/// Providers only know how to address their service; transport is owned
/// by the [`ProviderRouter`] so every provider shares one HTTP client.
pub trait ServiceProvider: Send + Sync {
    /// The service this provider addresses.
    fn service(&self) -> Service;

    /// Build the upstream request for `(entity_code, kind)`.
    fn build_request(&self, entity_code: &str, kind: DataKind)
        -> Result<HttpRequest, ProviderError>;
}

/// [`Fetcher`] that routes each data kind to the provider of its service.
pub struct ProviderRouter {
    client: Arc<dyn AsyncHttpClient>,
    providers: HashMap<Service, Box<dyn ServiceProvider>>,
}

impl ProviderRouter {
    /// Create a router with no providers registered.
    pub fn new(client: Arc<dyn AsyncHttpClient>) -> Self {
        Self {
            client,
            providers: HashMap::new(),
        }
    }

    /// Register a provider, replacing any previous provider for its service.
    pub fn with_provider(mut self, provider: impl ServiceProvider + 'static) -> Self {
        self.providers.insert(provider.service(), Box::new(provider));
        self
    }

    /// Services that currently have a provider.
    pub fn services(&self) -> Vec<Service> {
        let mut services: Vec<Service> = self.providers.keys().copied().collect();
        services.sort();
        services
    }
}

impl Fetcher for ProviderRouter {
    fn fetch<'a>(
        &'a self,
        entity_code: &'a str,
        kind: DataKind,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        Box::pin(async move {
            let service = kind.service();
            let provider = self
                .providers
                .get(&service)
                .ok_or(ProviderError::NotRegistered(service))?;
            let request = provider.build_request(entity_code, kind)?;

            debug!(entity = %entity_code, %kind, %service, "Fetching from provider");
            self.client.get(request).await
        })
    }
}
