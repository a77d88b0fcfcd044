//! API key issuance and authentication.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::{ApiKey, ApiKeyRole, NewApiKey};
use crate::domain::repositories::ApiKeyRepository;
use crate::error::AppError;
use crate::utils::code_generator::generate_api_key;
use serde_json::json;

type HmacSha256 = Hmac<Sha256>;

/// Service for API keys.
///
/// Keys are hashed with HMAC-SHA256 (keyed by the application `SECRET`)
/// before storage and comparison. Someone with read access to the database
/// cannot verify or forge keys without the secret.
pub struct ApiKeyService<R: ApiKeyRepository + ?Sized> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: ApiKeyRepository + ?Sized> ApiKeyService<R> {
    pub fn new(repository: Arc<R>, signing_secret: impl Into<String>) -> Self {
        Self {
            repository,
            signing_secret: signing_secret.into(),
        }
    }

    /// 64-character lowercase hex HMAC of `raw_key`.
    pub fn hash_key(&self, raw_key: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(raw_key.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Issues a new key. The raw key is returned once and never stored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the name is blank.
    /// Returns [`AppError::Conflict`] if a key with this name exists.
    /// Returns [`AppError::Internal`] on database or RNG errors.
    pub async fn create(
        &self,
        name: &str,
        expires_at: Option<DateTime<Utc>>,
        roles: Vec<ApiKeyRole>,
    ) -> Result<(ApiKey, String), AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::from_fields([("name", "API key name cannot be empty")]));
        }

        if self.repository.find_by_name(name).await?.is_some() {
            return Err(AppError::conflict(
                format!("An API key named \"{name}\" already exists"),
                json!({ "name": name }),
            ));
        }

        let raw_key = generate_api_key()?;
        let api_key = self
            .repository
            .create(NewApiKey {
                name: name.to_string(),
                key_hash: self.hash_key(&raw_key),
                expires_at,
                roles,
            })
            .await?;

        tracing::info!(api_key = %api_key.name, "API key created");
        Ok((api_key, raw_key))
    }

    /// Resolves a raw key into an enabled, unexpired [`ApiKey`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the key is unknown, disabled or expired.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn check(&self, raw_key: &str) -> Result<ApiKey, AppError> {
        let api_key = self.repository.find_by_hash(&self.hash_key(raw_key)).await?;

        match api_key {
            Some(api_key) if api_key.is_valid() => Ok(api_key),
            _ => Err(AppError::unauthorized(
                "Provided API key does not exist or is invalid",
                json!({ "reason": "invalid_api_key" }),
            )),
        }
    }

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list(&self, enabled_only: bool) -> Result<Vec<ApiKey>, AppError> {
        self.repository.list(enabled_only).await
    }

    /// Disables a key looked up by numeric id or by name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no key matches.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn disable(&self, name_or_id: &str) -> Result<ApiKey, AppError> {
        let found = match name_or_id.parse::<i64>() {
            Ok(id) => self.repository.find_by_id(id).await?,
            Err(_) => self.repository.find_by_name(name_or_id).await?,
        };

        let mut api_key = found.ok_or_else(|| {
            AppError::not_found(
                format!("API key \"{name_or_id}\" does not exist"),
                json!({ "api_key": name_or_id }),
            )
        })?;

        if api_key.enabled {
            self.repository.disable(api_key.id).await?;
            api_key.enabled = false;
            tracing::info!(api_key = %api_key.name, "API key disabled");
        }

        Ok(api_key)
    }
}
