//! Provider domain types.
//!
//! Every kind of data this crate refreshes is served by exactly one
//! quota-bearing upstream service. Both sets are closed enumerations and the
//! mapping between them is a static table ([`DataKind::service`]).

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An external, quota-bearing data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Unsplash photo search.
    Unsplash,
    /// US National Park Service developer API.
    Nps,
    /// NASA Earth imagery API.
    Nasa,
}

impl Service {
    /// All services in declaration order.
    pub const ALL: [Service; 3] = [Service::Unsplash, Service::Nps, Service::Nasa];

    /// Stable lowercase identifier (used in config keys, logs and JSON).
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Unsplash => "unsplash",
            Service::Nps => "nps",
            Service::Nasa => "nasa",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Category of data refreshed for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Landscape photographs.
    Images,
    /// Descriptive park details.
    Details,
    /// Current park alerts and closures.
    Alerts,
    /// Satellite imagery centred on the park.
    Satellite,
    /// Earth asset metadata (acquisition dates, scene ids) for the park.
    Terrain,
}

impl DataKind {
    /// All kinds in declared order. The refresh sweep visits kinds in this order.
    pub const ALL: [DataKind; 5] = [
        DataKind::Images,
        DataKind::Details,
        DataKind::Alerts,
        DataKind::Satellite,
        DataKind::Terrain,
    ];

    /// The service that serves this kind of data.
    pub fn service(&self) -> Service {
        match self {
            DataKind::Images => Service::Unsplash,
            DataKind::Details | DataKind::Alerts => Service::Nps,
            DataKind::Satellite | DataKind::Terrain => Service::Nasa,
        }
    }

    /// Stable lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Images => "images",
            DataKind::Details => "details",
            DataKind::Alerts => "alerts",
            DataKind::Satellite => "satellite",
            DataKind::Terrain => "terrain",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownName(s.to_string()))
    }
}

/// Returned when parsing a [`Service`] or [`DataKind`] from an unknown name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown name '{0}'")]
pub struct UnknownName(pub String);

/// Errors that can occur while fetching from an upstream provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The provider answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// No API key configured for the service.
    #[error("No API key configured for {0}")]
    MissingApiKey(Service),

    /// The entity is not in the catalog, so request parameters cannot be built.
    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    /// The service cannot serve the requested kind.
    #[error("{service} does not serve {kind}")]
    UnsupportedKind { service: Service, kind: DataKind },

    /// No provider is registered for the service.
    #[error("No provider registered for {0}")]
    NotRegistered(Service),
}

/// External fetch capability keyed by entity code and data kind.
///
/// This is the seam between the orchestrator and the outside world. Any
/// failure is reported as a [`ProviderError`]; callers treat all of them
/// uniformly as upstream failures.
pub trait Fetcher: Send + Sync {
    /// Fetch the current payload for `(entity_code, kind)`.
    fn fetch<'a>(
        &'a self,
        entity_code: &'a str,
        kind: DataKind,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>>;
}
