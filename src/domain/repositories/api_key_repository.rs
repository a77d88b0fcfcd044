//! Repository trait for API keys.

use crate::domain::entities::{ApiKey, NewApiKey};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for API key management.
///
/// Keys are stored as HMAC-SHA256 hashes; raw keys never reach the repository.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgApiKeyRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryApiKeyRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Stores a new key together with its roles.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name or hash already exists.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError>;

    /// Finds a key by hash, whatever its state.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<ApiKey>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_name(&self, name: &str) -> Result<Option<ApiKey>, AppError>;

    /// Lists keys, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, enabled_only: bool) -> Result<Vec<ApiKey>, AppError>;

    /// Disables a key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the key does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn disable(&self, id: i64) -> Result<(), AppError>;
}
