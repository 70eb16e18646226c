use std::time::Duration;

use async_trait::async_trait;

use crate::session::errors::CacheError;
use crate::session::ports::KeyValueCache;

pub mod memory;
pub mod redis;

pub use memory::InMemoryCache;
pub use self::redis::RedisCache;

/// Cache adapter chosen from configuration at startup.
#[derive(Clone)]
pub enum CacheBackend {
    Redis(RedisCache),
    Memory(InMemoryCache),
}

impl CacheBackend {
    pub fn name(&self) -> &'static str {
        match self {
            CacheBackend::Redis(_) => "redis",
            CacheBackend::Memory(_) => "memory",
        }
    }
}

#[async_trait]
impl KeyValueCache for CacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            CacheBackend::Redis(cache) => cache.get(key).await,
            CacheBackend::Memory(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        match self {
            CacheBackend::Redis(cache) => cache.set(key, value, ttl).await,
            CacheBackend::Memory(cache) => cache.set(key, value, ttl).await,
        }
    }

    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            CacheBackend::Redis(cache) => cache.take(key).await,
            CacheBackend::Memory(cache) => cache.take(key).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        match self {
            CacheBackend::Redis(cache) => cache.delete(key).await,
            CacheBackend::Memory(cache) => cache.delete(key).await,
        }
    }
}
