//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cache_store::CacheStoreError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The cache store could not be reached.
    #[error(transparent)]
    CacheUnavailable(#[from] CacheStoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::CacheUnavailable(err) => {
                tracing::error!(error = %err, "cache store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_unavailable_maps_to_503() {
        let err = ApiError::from(CacheStoreError::Unavailable("timeout".to_string()));
        assert_eq!(err.to_string(), "Cache store unavailable: timeout");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
