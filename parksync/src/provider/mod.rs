//! Upstream data provider abstraction
//!
//! This module provides the [`Fetcher`] seam used by the orchestrator and
//! its production implementation, [`ProviderRouter`], which dispatches each
//! [`DataKind`] to the provider of the [`Service`] that serves it.
//!
//! # Example
//!
//! ```ignore
//! use parksync::provider::{NpsProvider, ProviderRouter, ReqwestClient};
//!
//! let client = Arc::new(ReqwestClient::new()?);
//! let router = ProviderRouter::new(client)
//!     .with_provider(NpsProvider::new(Some(api_key)));
//! let body = router.fetch("YELL", DataKind::Details).await?;
//! ```

mod http;
mod nasa;
mod nps;
mod router;
mod types;
mod unsplash;

pub use http::{AsyncHttpClient, HttpRequest, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use nasa::NasaProvider;
pub use nps::NpsProvider;
pub use router::{ProviderRouter, ServiceProvider};
pub use types::{DataKind, Fetcher, ProviderError, Service, UnknownName};
pub use unsplash::UnsplashProvider;

