//! Health check handler.

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, response::IntoResponse, response::Response};

use crate::gateway::state::AppState;
use crate::gateway::types::ApiError;

/// A dependency the health endpoint verifies before reporting liveness.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
impl Pinger for crate::db::Database {
    async fn ping(&self) -> anyhow::Result<()> {
        self.health_check().await.map_err(Into::into)
    }
}

/// Liveness endpoint.
///
/// GET /health
///
/// Pings every registered dependency; any failure reports 503 without
/// exposing which dependency failed.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", content_type = "text/plain"),
        (status = 503, description = "A dependency is unreachable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<AppState>) -> Response {
    for pinger in state.pingers.iter() {
        if let Err(err) = pinger.ping().await {
            tracing::error!(error = %err, "health ping failed");
            return ApiError::service_unavailable("unavailable").into_response();
        }
    }

    (StatusCode::OK, "OK").into_response()
}
