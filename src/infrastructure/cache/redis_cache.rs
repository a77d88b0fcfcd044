//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService, CachedRedirect};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

const KEY_PREFIX: &str = "urlkeeper:redirect:";

/// Redis cache storing [`CachedRedirect`] values as JSON strings.
///
/// Connections are shared through a `ConnectionManager`. Every operation is
/// fail-open: errors are logged and reported as misses.
pub struct RedisCache {
    connection: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// `default_ttl_seconds` applies when [`CacheService::set_redirect`] is
    /// called without a TTL (`CACHE_TTL_SECONDS`).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut conn = manager.clone();
        conn.ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            connection: manager,
            default_ttl: default_ttl_seconds,
        })
    }

    fn build_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_redirect(&self, key: &str) -> CacheResult<Option<CachedRedirect>> {
        let mut conn = self.connection.clone();

        let raw = match conn.get::<_, Option<String>>(Self::build_key(key)).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                return Ok(None);
            }
        };

        let Some(raw) = raw else {
            debug!("Cache MISS: {}", key);
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(redirect) => {
                debug!("Cache HIT: {}", key);
                Ok(Some(redirect))
            }
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set_redirect(
        &self,
        key: &str,
        redirect: &CachedRedirect,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let payload = serde_json::to_string(redirect)
            .map_err(|e| CacheError::OperationError(e.to_string()))?;
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let mut conn = self.connection.clone();

        if let Err(e) = conn
            .set_ex::<_, _, ()>(Self::build_key(key), payload, ttl)
            .await
        {
            warn!("Redis SET error for {}: {}", key, e);
        } else {
            debug!("Cache SET: {} (TTL: {}s)", key, ttl);
        }

        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection.clone();

        match conn.del::<_, i32>(Self::build_key(key)).await {
            Ok(deleted) if deleted > 0 => debug!("Cache INVALIDATE: {}", key),
            Ok(_) => {}
            Err(e) => warn!("Redis DEL error for {}: {}", key, e),
        }

        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        conn.ping::<()>().await.is_ok()
    }
}
