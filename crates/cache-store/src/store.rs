use async_trait::async_trait;

use crate::Result;

/// Core trait for cache store clients.
///
/// Only reachability matters to this service. All implementations must be
/// thread-safe (Send + Sync) so a single handle can be shared by every
/// request.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Probes the store.
    ///
    /// Returns `Ok(true)` when the store answered as expected, `Ok(false)`
    /// when it answered with something unexpected, and an error when it
    /// could not be reached at all.
    async fn check_health(&self) -> Result<bool>;
}
