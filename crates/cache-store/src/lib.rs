//! Cache-store client used by the service to probe reachability.
//!
//! The [`CacheStore`] trait is the only capability the rest of the system
//! depends on. [`RedisCacheStore`] talks to a real Redis server and
//! [`InMemoryCacheStore`] is a controllable double for tests.

pub mod error;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use error::{CacheStoreError, Result};
pub use memory::InMemoryCacheStore;
pub use redis_store::RedisCacheStore;
pub use store::CacheStore;
