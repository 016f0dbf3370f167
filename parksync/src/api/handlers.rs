//! Route handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

use super::error::ApiError;
use crate::app::ParkSyncApp;
use crate::orchestrator::{RefreshError, RefreshRequest};
use crate::provider::{DataKind, Service};
use crate::rate_limit::QuotaSnapshot;
use crate::refresh::SweepStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub entity_code: String,
    pub data_kind: DataKind,
    pub service: Service,
    pub fetched_at: DateTime<Utc>,
    pub remaining_quota: u32,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct ArtifactResponse {
    pub entity_code: String,
    pub data_kind: DataKind,
    pub service: Service,
    pub fetched_at: DateTime<Utc>,
    pub age_secs: i64,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    pub services: Vec<QuotaSnapshot>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

pub async fn refresh(
    State(app): State<Arc<ParkSyncApp>>,
    Path((entity_code, data_kind)): Path<(String, String)>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let request = RefreshRequest::parse(&entity_code, &data_kind)?;
    debug!(request = %request, "Refresh requested");

    // Run detached so a dropped connection cannot abandon a consumed slot
    // between fetch and store.
    let orchestrator = app.orchestrator().clone();
    let outcome = tokio::spawn(async move { orchestrator.refresh(&request).await })
        .await
        .map_err(|e| {
            error!(error = %e, "Refresh task failed");
            RefreshError::Internal(format!("refresh task failed: {}", e))
        })??;

    Ok(Json(RefreshResponse {
        bytes: outcome.payload.len(),
        entity_code: outcome.entity_code,
        data_kind: outcome.data_kind,
        service: outcome.service,
        fetched_at: outcome.fetched_at,
        remaining_quota: outcome.remaining_quota,
    }))
}

pub async fn artifact(
    State(app): State<Arc<ParkSyncApp>>,
    Path((entity_code, data_kind)): Path<(String, String)>,
) -> Result<Json<ArtifactResponse>, ApiError> {
    let request = RefreshRequest::parse(&entity_code, &data_kind)?;
    let artifact = app
        .cache()
        .get(&request.entity_code, request.data_kind)
        .await?;

    Ok(Json(ArtifactResponse {
        age_secs: (Utc::now() - artifact.fetched_at).num_seconds().max(0),
        bytes: artifact.payload.len(),
        entity_code: artifact.entity_code,
        data_kind: artifact.data_kind,
        service: artifact.service,
        fetched_at: artifact.fetched_at,
    }))
}

pub async fn quota(State(app): State<Arc<ParkSyncApp>>) -> Json<QuotaResponse> {
    Json(QuotaResponse {
        services: app.limiter().snapshot(),
    })
}

pub async fn start_sweep(State(app): State<Arc<ParkSyncApp>>) -> Json<SweepStatus> {
    Json(app.controller().start().status())
}

pub async fn sweep_status(State(app): State<Arc<ParkSyncApp>>) -> Json<SweepStatus> {
    Json(app.controller().status())
}

pub async fn cancel_sweep(State(app): State<Arc<ParkSyncApp>>) -> Json<SweepStatus> {
    Json(app.controller().cancel())
}
