//! PostgreSQL implementation of API key repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{ApiKey, ApiKeyRole, NewApiKey};
use crate::domain::repositories::ApiKeyRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    id: i64,
    name: String,
    key_hash: String,
    enabled: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    api_key_id: i64,
    role_name: String,
    domain_id: Option<i64>,
    authority: Option<String>,
}

impl RoleRow {
    fn into_role(self) -> Option<ApiKeyRole> {
        match (self.role_name.as_str(), self.domain_id, self.authority) {
            ("AUTHORED_SHORT_URLS", _, _) => Some(ApiKeyRole::AuthoredShortUrls),
            ("DOMAIN_SPECIFIC", Some(domain_id), Some(authority)) => {
                Some(ApiKeyRole::DomainSpecific {
                    domain_id,
                    authority,
                })
            }
            (name, _, _) => {
                tracing::warn!(api_key_id = self.api_key_id, role = %name, "Skipping unusable API key role");
                None
            }
        }
    }
}

/// PostgreSQL repository for API keys.
///
/// Only the HMAC of a key is stored. Roles live in `api_key_roles`, one row
/// per role.
pub struct PgApiKeyRepository {
    pool: Arc<PgPool>,
}

impl PgApiKeyRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn with_roles(&self, rows: Vec<ApiKeyRow>) -> Result<Vec<ApiKey>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let role_rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.api_key_id, r.role_name, r.domain_id, d.authority
            FROM api_key_roles r
            LEFT JOIN domains d ON d.id = r.domain_id
            WHERE r.api_key_id = ANY($1)
            ORDER BY r.id
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut roles: HashMap<i64, Vec<ApiKeyRole>> = HashMap::new();
        for row in role_rows {
            let api_key_id = row.api_key_id;
            if let Some(role) = row.into_role() {
                roles.entry(api_key_id).or_default().push(role);
            }
        }

        Ok(rows
            .into_iter()
            .map(|r| ApiKey {
                roles: roles.remove(&r.id).unwrap_or_default(),
                id: r.id,
                name: r.name,
                key_hash: r.key_hash,
                enabled: r.enabled,
                expires_at: r.expires_at,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn find_one_by(&self, column: &str, value: Lookup<'_>) -> Result<Option<ApiKey>, AppError> {
        let sql = format!(
            "SELECT id, name, key_hash, enabled, expires_at, created_at FROM api_keys WHERE {column} = $1"
        );

        let query = sqlx::query_as::<_, ApiKeyRow>(&sql);
        let row = match value {
            Lookup::Id(id) => query.bind(id),
            Lookup::Text(text) => query.bind(text),
        }
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(self.with_roles(row.into_iter().collect()).await?.pop())
    }
}

enum Lookup<'a> {
    Id(i64),
    Text(&'a str),
}

#[async_trait]
impl ApiKeyRepository for PgApiKeyRepository {
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKey, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            INSERT INTO api_keys (name, key_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, key_hash, enabled, expires_at, created_at
            "#,
        )
        .bind(&new_key.name)
        .bind(&new_key.key_hash)
        .bind(new_key.expires_at)
        .fetch_one(&mut *tx)
        .await?;

        for role in &new_key.roles {
            let domain_id = match role {
                ApiKeyRole::DomainSpecific { domain_id, .. } => Some(*domain_id),
                ApiKeyRole::AuthoredShortUrls => None,
            };

            sqlx::query(
                "INSERT INTO api_key_roles (api_key_id, role_name, domain_id) VALUES ($1, $2, $3)",
            )
            .bind(row.id)
            .bind(role.name())
            .bind(domain_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(ApiKey {
            id: row.id,
            name: row.name,
            key_hash: row.key_hash,
            enabled: row.enabled,
            expires_at: row.expires_at,
            roles: new_key.roles,
            created_at: row.created_at,
        })
    }

    async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, AppError> {
        self.find_one_by("key_hash", Lookup::Text(key_hash)).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiKey>, AppError> {
        self.find_one_by("id", Lookup::Id(id)).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiKey>, AppError> {
        self.find_one_by("name", Lookup::Text(name)).await
    }

    async fn list(&self, enabled_only: bool) -> Result<Vec<ApiKey>, AppError> {
        let rows = sqlx::query_as::<_, ApiKeyRow>(
            r#"
            SELECT id, name, key_hash, enabled, expires_at, created_at
            FROM api_keys
            WHERE ($1 = FALSE OR enabled)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(enabled_only)
        .fetch_all(self.pool.as_ref())
        .await?;

        self.with_roles(rows).await
    }

    async fn disable(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE api_keys SET enabled = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "API key not found",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }
}
