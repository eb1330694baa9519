//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use cache_store::CacheStore;
use serde::Serialize;

use crate::error::ApiError;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health — reports whether the cache store is reachable.
///
/// `200` when the probe answers `true`, `503` when it answers `false` or
/// fails.
#[tracing::instrument(skip(cache))]
pub async fn check(
    State(cache): State<Arc<dyn CacheStore>>,
) -> Result<(StatusCode, Json<HealthResponse>), ApiError> {
    if cache.check_health().await? {
        Ok((StatusCode::OK, Json(HealthResponse { status: "ok" })))
    } else {
        tracing::warn!("cache store reported unhealthy");
        Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
            }),
        ))
    }
}
