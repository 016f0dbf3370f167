//! HTTP error mapping.

use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::cache::ArtifactError;
use crate::orchestrator::RefreshError;
use crate::provider::Service;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Refresh(#[from] RefreshError),

    #[error("{0}")]
    Artifact(#[from] ArtifactError),
}

/// Whole seconds to wait, rounded up so clients never retry early.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Refresh(err) => match err {
                RefreshError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                RefreshError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                RefreshError::Upstream { .. } => StatusCode::BAD_GATEWAY,
                RefreshError::Storage(_) | RefreshError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Artifact(err) => match err {
                ArtifactError::NotFound { .. } => StatusCode::NOT_FOUND,
                ArtifactError::Storage(_) | ArtifactError::Corrupt { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn body(&self) -> ErrorBody {
        let opaque = |kind| ErrorBody {
            error: "internal error".to_string(),
            kind,
            service: None,
            retry_after_secs: None,
        };

        match self {
            ApiError::Refresh(err) => match err {
                RefreshError::InvalidRequest(_) => ErrorBody {
                    error: err.public_message(),
                    kind: err.kind(),
                    service: None,
                    retry_after_secs: None,
                },
                RefreshError::RateLimited {
                    service,
                    retry_after,
                } => ErrorBody {
                    error: err.public_message(),
                    kind: err.kind(),
                    service: Some(*service),
                    retry_after_secs: Some(retry_after_secs(*retry_after)),
                },
                RefreshError::Upstream { service, .. } => ErrorBody {
                    error: err.public_message(),
                    kind: err.kind(),
                    service: Some(*service),
                    retry_after_secs: None,
                },
                RefreshError::Storage(_) | RefreshError::Internal(_) => opaque(err.kind()),
            },
            ApiError::Artifact(err @ ArtifactError::NotFound { .. }) => ErrorBody {
                error: err.to_string(),
                kind: "not_found",
                service: None,
                retry_after_secs: None,
            },
            ApiError::Artifact(_) => opaque("storage_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        if code.is_server_error() || code == StatusCode::BAD_GATEWAY {
            error!(status = code.as_u16(), error = %self, "Request failed");
        }

        let body = self.body();
        let retry_after = body.retry_after_secs;
        let mut response = (code, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
