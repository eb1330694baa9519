use thiserror::Error;

/// Errors that can occur when talking to the cache store.
#[derive(Debug, Error)]
pub enum CacheStoreError {
    /// The Redis client reported a connection or protocol failure.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The store could not be reached for another reason.
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for cache store operations.
pub type Result<T> = std::result::Result<T, CacheStoreError>;
