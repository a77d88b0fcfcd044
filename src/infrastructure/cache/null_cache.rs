//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService, CachedRedirect};
use async_trait::async_trait;
use tracing::debug;

/// A cache that stores nothing; every lookup is a miss.
///
/// Used when `REDIS_URL` is not configured, when Redis is unreachable at
/// startup, and by the in-memory storage mode.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_redirect(&self, _key: &str) -> CacheResult<Option<CachedRedirect>> {
        Ok(None)
    }

    async fn set_redirect(
        &self,
        _key: &str,
        _redirect: &CachedRedirect,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
