use std::time::Duration;

use ::redis::aio::MultiplexedConnection;
use ::redis::AsyncCommands;
use ::redis::Client;
use async_trait::async_trait;

use crate::session::errors::CacheError;
use crate::session::ports::KeyValueCache;

/// Redis-backed shared store.
///
/// Every instance of the service talks to the same Redis, so verification codes
/// and session records are visible to all request handlers.
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    /// Connect to Redis.
    ///
    /// # Errors
    /// * `ConnectionFailed` - URL is invalid or the server is unreachable
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(|e| CacheError::ConnectionFailed(e.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?;

        tracing::info!(cache = "redis", "Redis connection established");
        Ok(Self { connection })
    }

    fn ttl_millis(ttl: Duration) -> u64 {
        // PSETEX rejects a zero expiry
        u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
    }
}

#[async_trait]
impl KeyValueCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        connection
            .get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::CommandFailed(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        ::redis::cmd("PSETEX")
            .arg(key)
            .arg(Self::ttl_millis(ttl))
            .arg(value)
            .query_async::<_, ()>(&mut connection)
            .await
            .map_err(|e| CacheError::CommandFailed(e.to_string()))
    }

    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        // GETDEL is a single command, so two callers can never both read the value
        ::redis::cmd("GETDEL")
            .arg(key)
            .query_async::<_, Option<String>>(&mut connection)
            .await
            .map_err(|e| CacheError::CommandFailed(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut connection = self.connection.clone();
        let removed = connection
            .del::<_, i64>(key)
            .await
            .map_err(|e| CacheError::CommandFailed(e.to_string()))?;
        Ok(removed > 0)
    }
}
