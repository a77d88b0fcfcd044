//! In-memory implementation of API key repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{ApiKey, NewApiKey};
use crate::domain::repositories::ApiKeyRepository;
use crate::error::AppError;

#[derive(Default)]
pub struct InMemoryApiKeyRepository {
    keys: RwLock<Vec<ApiKey>>,
}

impl InMemoryApiKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn find_by<F>(&self, predicate: F) -> Option<ApiKey>
    where
        F: Fn(&ApiKey) -> bool,
    {
        self.keys.read().await.iter().find(|k| predicate(k)).cloned()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError> {
        let mut keys = self.keys.write().await;

        if keys
            .iter()
            .any(|k| k.name == new_key.name || k.key_hash == new_key.key_hash)
        {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "api_keys_name_key" }),
            ));
        }

        let api_key = ApiKey {
            id: keys.iter().map(|k| k.id).max().unwrap_or(0) + 1,
            name: new_key.name,
            key_hash: new_key.key_hash,
            enabled: true,
            expires_at: new_key.expires_at,
            roles: new_key.roles,
            created_at: Utc::now(),
        };
        keys.push(api_key.clone());

        Ok(api_key)
    }

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        Ok(self.find_by(|k| k.key_hash == key_hash).await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiKey>, AppError> {
        Ok(self.find_by(|k| k.id == id).await)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiKey>, AppError> {
        Ok(self.find_by(|k| k.name == name).await)
    }

    async fn list(&self, enabled_only: bool) -> Result<Vec<ApiKey>, AppError> {
        let keys = self.keys.read().await;

        Ok(keys
            .iter()
            .rev()
            .filter(|k| !enabled_only || k.enabled)
            .cloned()
            .collect())
    }

    async fn disable(&self, id: i64) -> Result<(), AppError> {
        let mut keys = self.keys.write().await;

        let api_key = keys
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| AppError::not_found("API key not found", json!({ "id": id })))?;
        api_key.enabled = false;

        Ok(())
    }
}
