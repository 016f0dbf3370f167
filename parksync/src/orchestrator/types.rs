//! Orchestrator types and errors

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::cache::ServiceCacheError;
use crate::catalog::is_valid_code;
use crate::provider::{DataKind, ProviderError, Service};

/// Errors returned by a single-item refresh.
///
/// `RateLimited` is an expected outcome, not a fault: callers are expected
/// to branch on it and retry after `retry_after`.
#[derive(Debug)]
pub enum RefreshError {
    /// Malformed input. Never worth retrying.
    InvalidRequest(String),
    /// The service's quota window is exhausted.
    RateLimited {
        service: Service,
        retry_after: Duration,
    },
    /// The upstream fetch failed.
    Upstream {
        service: Service,
        source: ProviderError,
    },
    /// The payload was fetched but could not be stored. The quota slot
    /// stays consumed.
    Storage(ServiceCacheError),
    /// Unexpected failure.
    Internal(String),
}

impl RefreshError {
    /// Short machine-readable label.
    pub fn kind(&self) -> &'static str {
        match self {
            RefreshError::InvalidRequest(_) => "invalid_request",
            RefreshError::RateLimited { .. } => "rate_limited",
            RefreshError::Upstream { .. } => "upstream_error",
            RefreshError::Storage(_) => "storage_error",
            RefreshError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to show callers: storage and internal details are
    /// replaced, upstream errors name only the service.
    pub fn public_message(&self) -> String {
        match self {
            RefreshError::InvalidRequest(_) => self.to_string(),
            RefreshError::RateLimited { service, .. } => {
                format!("rate limit exceeded for {}", service)
            }
            RefreshError::Upstream { service, .. } => {
                format!("upstream request to {} failed", service)
            }
            RefreshError::Storage(_) | RefreshError::Internal(_) => "internal error".to_string(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RefreshError::RateLimited { .. })
    }
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            RefreshError::RateLimited {
                service,
                retry_after,
            } => write!(
                f,
                "Rate limited by {}: retry after {:.1}s",
                service,
                retry_after.as_secs_f64()
            ),
            RefreshError::Upstream { service, source } => {
                write!(f, "Upstream error from {}: {}", service, source)
            }
            RefreshError::Storage(e) => write!(f, "Storage error: {}", e),
            RefreshError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for RefreshError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RefreshError::Upstream { source, .. } => Some(source),
            RefreshError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ServiceCacheError> for RefreshError {
    fn from(e: ServiceCacheError) -> Self {
        RefreshError::Storage(e)
    }
}

/// A validated unit of refresh work.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefreshRequest {
    pub entity_code: String,
    pub data_kind: DataKind,
}

impl RefreshRequest {
    /// Validate an entity code and build a request.
    pub fn new(entity_code: &str, data_kind: DataKind) -> Result<Self, RefreshError> {
        validate_entity_code(entity_code)?;
        Ok(Self {
            entity_code: entity_code.to_string(),
            data_kind,
        })
    }

    /// Build a request from untyped input, as received at the API boundary.
    pub fn parse(entity_code: &str, data_kind: &str) -> Result<Self, RefreshError> {
        if data_kind.trim().is_empty() {
            return Err(RefreshError::InvalidRequest(
                "data kind is required".to_string(),
            ));
        }
        let kind = data_kind.parse::<DataKind>().map_err(|_| {
            RefreshError::InvalidRequest(format!("unknown data kind '{}'", data_kind))
        })?;
        Self::new(entity_code, kind)
    }
}

impl fmt::Display for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_code, self.data_kind)
    }
}

pub(crate) fn validate_entity_code(entity_code: &str) -> Result<(), RefreshError> {
    if entity_code.is_empty() {
        return Err(RefreshError::InvalidRequest(
            "entity code is required".to_string(),
        ));
    }
    if !is_valid_code(entity_code) {
        return Err(RefreshError::InvalidRequest(format!(
            "malformed entity code '{}'",
            entity_code
        )));
    }
    Ok(())
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub entity_code: String,
    pub data_kind: DataKind,
    pub service: Service,
    pub payload: Bytes,
    pub fetched_at: DateTime<Utc>,
    /// Requests left in the service's current window after this one.
    pub remaining_quota: u32,
}
