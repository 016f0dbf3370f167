//! HTTP API.
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/api/health` | liveness |
//! | POST | `/api/refresh/:entity_code/:data_kind` | single-item refresh |
//! | GET | `/api/artifacts/:entity_code/:data_kind` | cached artifact metadata |
//! | GET | `/api/quota` | per-service quota usage |
//! | POST / GET / DELETE | `/api/sweep` | start / inspect / cancel the sweep |

mod error;
mod handlers;

pub use error::{retry_after_secs, ApiError, ErrorBody};
pub use handlers::{ArtifactResponse, HealthResponse, QuotaResponse, RefreshResponse};

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::app::ParkSyncApp;

/// Build the router over a started application.
pub fn router(app: Arc<ParkSyncApp>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/refresh/:entity_code/:data_kind",
            post(handlers::refresh),
        )
        .route(
            "/api/artifacts/:entity_code/:data_kind",
            get(handlers::artifact),
        )
        .route("/api/quota", get(handlers::quota))
        .route(
            "/api/sweep",
            post(handlers::start_sweep)
                .get(handlers::sweep_status)
                .delete(handlers::cancel_sweep),
        )
        .with_state(app)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    app: Arc<ParkSyncApp>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP API listening");
    }
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown)
        .await
}
