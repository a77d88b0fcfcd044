//! In-memory implementation of domain repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{Domain, NewDomain, NotFoundRedirects};
use crate::domain::models::VisibilitySpec;
use crate::domain::repositories::DomainRepository;
use crate::error::AppError;

/// Domains kept in a vector behind a lock. Ids start at 1.
#[derive(Default)]
pub struct InMemoryDomainRepository {
    domains: RwLock<Vec<Domain>>,
}

impl InMemoryDomainRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainRepository for InMemoryDomainRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Domain>, AppError> {
        let domains = self.domains.read().await;
        Ok(domains.iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_authority(&self, authority: &str) -> Result<Option<Domain>, AppError> {
        let domains = self.domains.read().await;
        Ok(domains.iter().find(|d| d.authority == authority).cloned())
    }

    async fn find_domains_without(
        &self,
        excluded_authority: String,
        spec: Option<VisibilitySpec>,
    ) -> Result<Vec<Domain>, AppError> {
        let domain_id = spec.and_then(|s| s.domain_id);
        let domains = self.domains.read().await;

        let mut found: Vec<Domain> = domains
            .iter()
            .filter(|d| d.authority != excluded_authority)
            .filter(|d| domain_id.is_none_or(|id| d.id == id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.authority.cmp(&b.authority));

        Ok(found)
    }

    async fn upsert(&self, new_domain: NewDomain) -> Result<Domain, AppError> {
        let mut domains = self.domains.write().await;

        if let Some(existing) = domains.iter().find(|d| d.authority == new_domain.authority) {
            return Ok(existing.clone());
        }

        let id = domains.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let domain = Domain::new(id, new_domain.authority);
        domains.push(domain.clone());

        Ok(domain)
    }

    async fn save_redirects(
        &self,
        id: i64,
        redirects: NotFoundRedirects,
    ) -> Result<Domain, AppError> {
        let mut domains = self.domains.write().await;

        let domain = domains
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| AppError::not_found("Domain not found", json!({ "id": id })))?;

        domain.redirects = redirects;
        domain.updated_at = Utc::now();

        Ok(domain.clone())
    }
}
