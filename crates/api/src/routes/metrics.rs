//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

use crate::telemetry::{EXPOSITION_CONTENT_TYPE, MetricsRegistry};

/// GET /metrics — current registry contents in text exposition format.
pub async fn get(State(registry): State<MetricsRegistry>) -> impl IntoResponse {
    ([(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], registry.render())
}
