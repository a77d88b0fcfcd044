//! PostgreSQL implementation of domain repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Domain, NewDomain, NotFoundRedirects};
use crate::domain::models::VisibilitySpec;
use crate::domain::repositories::DomainRepository;
use crate::error::AppError;
use serde_json::json;

#[derive(sqlx::FromRow)]
struct DomainRow {
    id: i64,
    authority: String,
    base_url_redirect: Option<String>,
    regular_404_redirect: Option<String>,
    invalid_short_url_redirect: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DomainRow> for Domain {
    fn from(r: DomainRow) -> Self {
        Domain {
            id: r.id,
            authority: r.authority,
            redirects: NotFoundRedirects::new(
                r.base_url_redirect,
                r.regular_404_redirect,
                r.invalid_short_url_redirect,
            ),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for custom domains.
pub struct PgDomainRepository {
    pool: Arc<PgPool>,
}

impl PgDomainRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DomainRepository for PgDomainRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Domain>, AppError> {
        let row = sqlx::query_as::<_, DomainRow>(
            r#"
            SELECT id, authority, base_url_redirect, regular_404_redirect,
                   invalid_short_url_redirect, created_at, updated_at
            FROM domains
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Domain::from))
    }

    async fn find_by_authority(&self, authority: &str) -> Result<Option<Domain>, AppError> {
        let row = sqlx::query_as::<_, DomainRow>(
            r#"
            SELECT id, authority, base_url_redirect, regular_404_redirect,
                   invalid_short_url_redirect, created_at, updated_at
            FROM domains
            WHERE authority = $1
            "#,
        )
        .bind(authority)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Domain::from))
    }

    async fn find_domains_without(
        &self,
        excluded_authority: String,
        spec: Option<VisibilitySpec>,
    ) -> Result<Vec<Domain>, AppError> {
        let domain_id = spec.and_then(|s| s.domain_id);

        let rows = sqlx::query_as::<_, DomainRow>(
            r#"
            SELECT id, authority, base_url_redirect, regular_404_redirect,
                   invalid_short_url_redirect, created_at, updated_at
            FROM domains
            WHERE authority <> $1
              AND ($2::bigint IS NULL OR id = $2)
            ORDER BY authority
            "#,
        )
        .bind(excluded_authority)
        .bind(domain_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Domain::from).collect())
    }

    async fn upsert(&self, new_domain: NewDomain) -> Result<Domain, AppError> {
        let row = sqlx::query_as::<_, DomainRow>(
            r#"
            INSERT INTO domains (authority)
            VALUES ($1)
            ON CONFLICT (authority) DO UPDATE SET authority = EXCLUDED.authority
            RETURNING id, authority, base_url_redirect, regular_404_redirect,
                      invalid_short_url_redirect, created_at, updated_at
            "#,
        )
        .bind(&new_domain.authority)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn save_redirects(
        &self,
        id: i64,
        redirects: NotFoundRedirects,
    ) -> Result<Domain, AppError> {
        let row = sqlx::query_as::<_, DomainRow>(
            r#"
            UPDATE domains SET
                base_url_redirect          = $2,
                regular_404_redirect       = $3,
                invalid_short_url_redirect = $4,
                updated_at                 = NOW()
            WHERE id = $1
            RETURNING id, authority, base_url_redirect, regular_404_redirect,
                      invalid_short_url_redirect, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(redirects.base_url_redirect)
        .bind(redirects.regular_404_redirect)
        .bind(redirects.invalid_short_url_redirect)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Domain::from)
            .ok_or_else(|| AppError::not_found("Domain not found", json!({ "id": id })))
    }
}
