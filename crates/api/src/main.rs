//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use api::telemetry::MetricsRegistry;
use cache_store::RedisCacheStore;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Create the metrics registry and start sampling process metrics
    let metrics = MetricsRegistry::new();
    metrics.register_defaults();
    let sampler = metrics.spawn_sampler(config.metrics_sample_interval);

    // 3. Connect to the cache store before serving health checks
    let cache = RedisCacheStore::connect(&config.redis_url)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to connect to redis"))?;

    // 4. Build the application
    let app = api::create_app(Arc::new(cache), metrics);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sampler.abort();
    tracing::info!("server shut down gracefully");
    Ok(())
}
