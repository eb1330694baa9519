//! HTTP service with a greeting, a cache-store health check and Prometheus
//! metrics.
//!
//! Collaborators are passed in explicitly: the cache store as an
//! `Arc<dyn CacheStore>` and the metrics registry as an owned
//! [`MetricsRegistry`].

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use cache_store::CacheStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use telemetry::MetricsRegistry;

/// Creates the Axum application router with all routes and their state.
pub fn create_app(cache: Arc<dyn CacheStore>, metrics: MetricsRegistry) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics.clone());

    Router::new()
        .route("/", get(routes::root::hello))
        .route("/health", get(routes::health::check))
        .with_state(cache)
        .merge(metrics_router)
        .route_layer(axum::middleware::from_fn_with_state(
            metrics,
            middleware::track_metrics,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
