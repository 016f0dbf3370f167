//! Application error types.

use std::fmt;

use crate::catalog::CatalogError;
use crate::provider::ProviderError;

/// Errors that can occur during application startup.
#[derive(Debug)]
pub enum AppError {
    /// Failed to load the entity catalog.
    Catalog(CatalogError),

    /// Failed to build the HTTP client.
    HttpClient(ProviderError),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Catalog(e) => write!(f, "Failed to load entity catalog: {}", e),
            AppError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Catalog(e) => Some(e),
            AppError::HttpClient(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        AppError::Catalog(e)
    }
}
