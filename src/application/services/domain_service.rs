//! Domain management service.

use crate::domain::entities::{ApiKey, Domain, DomainItem, NewDomain, NotFoundRedirects};
use crate::domain::repositories::DomainRepository;
use crate::error::AppError;
use serde_json::json;
use std::sync::Arc;

/// Service for custom domains and their "not found" redirects.
///
/// The default domain is not stored: its authority and redirects come from
/// configuration and are only surfaced through [`Self::list_domains`].
pub struct DomainService<R: DomainRepository + ?Sized> {
    repository: Arc<R>,
    default_domain: String,
    default_redirects: NotFoundRedirects,
}

impl<R: DomainRepository + ?Sized> DomainService<R> {
    pub fn new(
        repository: Arc<R>,
        default_domain: impl Into<String>,
        default_redirects: NotFoundRedirects,
    ) -> Self {
        Self {
            repository,
            default_domain: default_domain.into(),
            default_redirects,
        }
    }

    pub fn default_domain(&self) -> &str {
        &self.default_domain
    }

    pub fn default_redirects(&self) -> &NotFoundRedirects {
        &self.default_redirects
    }

    /// Lists the domains visible to `api_key`.
    ///
    /// The default domain comes first, unless the key is restricted to a
    /// specific domain, in which case it is left out.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_domains(&self, api_key: Option<&ApiKey>) -> Result<Vec<DomainItem>, AppError> {
        let domains = self
            .repository
            .find_domains_without(self.default_domain.clone(), api_key.map(ApiKey::spec))
            .await?;

        let mapped = domains.iter().map(DomainItem::for_existing_domain);

        if api_key.is_some_and(ApiKey::is_domain_specific) {
            return Ok(mapped.collect());
        }

        let default = DomainItem::for_default_domain(&self.default_domain, &self.default_redirects);
        Ok(std::iter::once(default).chain(mapped).collect())
    }

    /// Retrieves a domain by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the domain does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_domain(&self, id: i64) -> Result<Domain, AppError> {
        self.repository.find_by_id(id).await?.ok_or_else(|| {
            AppError::not_found(
                format!("Domain with id \"{id}\" could not be found"),
                json!({ "id": id }),
            )
        })
    }

    /// Finds a stored domain by authority, honoring a domain-specific key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn find_by_authority(
        &self,
        authority: &str,
        api_key: Option<&ApiKey>,
    ) -> Result<Option<Domain>, AppError> {
        let domain = self.repository.find_by_authority(authority).await?;

        Ok(domain.filter(|d| {
            api_key
                .and_then(ApiKey::domain_id)
                .is_none_or(|allowed| allowed == d.id)
        }))
    }

    /// Returns the domain with `authority`, creating it when missing.
    ///
    /// The domain is persisted once whether or not it already existed, so
    /// concurrent first uses of an authority resolve to the same row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the authority is malformed.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_or_create(&self, authority: &str) -> Result<Domain, AppError> {
        let authority = authority.trim().to_ascii_lowercase();
        validate_authority(&authority)?;

        tracing::debug!(authority = %authority, "Persisting domain");
        self.repository.upsert(NewDomain { authority }).await
    }

    /// Sets the three "not found" redirects of a domain, creating the domain
    /// first if needed. Persists the domain once, then writes the redirects.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the authority is malformed.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn configure_not_found_redirects(
        &self,
        authority: &str,
        redirects: NotFoundRedirects,
    ) -> Result<Domain, AppError> {
        let domain = self.get_or_create(authority).await?;
        self.repository.save_redirects(domain.id, redirects).await
    }
}

/// Checks that `authority` looks like `host[:port]`.
fn validate_authority(authority: &str) -> Result<(), AppError> {
    if authority.is_empty() || authority.len() > 255 {
        return Err(AppError::from_fields([(
            "domain",
            "Domain must be between 1 and 255 characters",
        )]));
    }

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    };

    if port.is_some_and(|p| p.parse::<u16>().is_err()) {
        return Err(AppError::from_fields([("domain", "Invalid port")]));
    }

    let valid_host = !host.is_empty()
        && !host.starts_with(['.', '-'])
        && !host.ends_with(['.', '-'])
        && host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');

    if !valid_host {
        return Err(AppError::from_fields([(
            "domain",
            "Domain can only contain letters, digits, dots and hyphens",
        )]));
    }

    Ok(())
}
