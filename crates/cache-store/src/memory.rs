use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::{CacheStore, CacheStoreError, Result};

#[derive(Debug)]
struct InMemoryCacheState {
    reachable: bool,
    failure: Option<String>,
    checks: usize,
}

/// In-memory cache store for testing.
///
/// Reports reachable by default. Tests flip it to unreachable or make the
/// probe fail outright.
#[derive(Debug, Clone)]
pub struct InMemoryCacheStore {
    state: Arc<RwLock<InMemoryCacheState>>,
}

impl InMemoryCacheStore {
    /// Creates a reachable in-memory cache store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryCacheState {
                reachable: true,
                failure: None,
                checks: 0,
            })),
        }
    }

    /// Creates a store whose probe answers `false`.
    pub fn unreachable() -> Self {
        let store = Self::new();
        store.set_reachable(false);
        store
    }

    /// Sets the value returned by subsequent probes.
    pub fn set_reachable(&self, reachable: bool) {
        self.state.write().unwrap().reachable = reachable;
    }

    /// Makes subsequent probes fail with the given reason, or clears the
    /// failure when `None`.
    pub fn set_failure(&self, reason: Option<&str>) {
        self.state.write().unwrap().failure = reason.map(String::from);
    }

    /// Returns the number of probes issued so far.
    pub fn check_count(&self) -> usize {
        self.state.read().unwrap().checks
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn check_health(&self) -> Result<bool> {
        let mut state = self.state.write().unwrap();
        state.checks += 1;

        if let Some(reason) = &state.failure {
            return Err(CacheStoreError::Unavailable(reason.clone()));
        }

        Ok(state.reachable)
    }
}
