//! Cache service trait and error types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::ShortUrl;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// What a redirect needs to know about a short URL.
///
/// Short URLs limited by `max_visits` are never cached since their
/// availability changes with every visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRedirect {
    pub short_url_id: i64,
    pub long_url: String,
    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl CachedRedirect {
    pub fn from_short_url(short_url: &ShortUrl) -> Option<Self> {
        if short_url.max_visits.is_some() {
            return None;
        }

        Some(Self {
            short_url_id: short_url.id,
            long_url: short_url.long_url.clone(),
            valid_since: short_url.valid_since,
            valid_until: short_url.valid_until,
        })
    }

    pub fn is_enabled_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_since.is_none_or(|since| since <= now)
            && self.valid_until.is_none_or(|until| until >= now)
    }
}

/// Cache of redirect targets, keyed by `authority:short_code`.
///
/// Implementations are fail-open: backend errors are logged and reported as
/// misses so redirects fall back to the database.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached redirect for `key`, `Ok(None)` on miss or backend error.
    async fn get_redirect(&self, key: &str) -> CacheResult<Option<CachedRedirect>>;

    /// Stores a redirect. `ttl_seconds: None` uses the implementation default.
    async fn set_redirect(
        &self,
        key: &str,
        redirect: &CachedRedirect,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes a cached redirect after its short URL was edited or deleted.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
