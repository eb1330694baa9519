use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::{CacheStore, Result};

/// Redis-backed cache store client.
///
/// Wraps a [`ConnectionManager`], which reconnects transparently after a
/// dropped connection. Cloning is cheap and shares the underlying connection.
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: ConnectionManager,
}

impl RedisCacheStore {
    /// Opens a managed connection to the Redis server at `url`.
    ///
    /// Fails if the URL is malformed or the initial connection cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_connection_manager().await?;
        tracing::info!("connected to redis");
        Ok(Self { connection })
    }

    /// Creates a store from an existing connection manager.
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn check_health(&self) -> Result<bool> {
        let mut connection = self.connection.clone();
        let reply: String = redis::cmd("PING").query_async(&mut connection).await?;
        tracing::debug!(%reply, "redis ping");
        Ok(reply == "PONG")
    }
}
