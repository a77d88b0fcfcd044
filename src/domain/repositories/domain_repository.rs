//! Repository trait for custom domains.

use crate::domain::entities::{Domain, NewDomain, NotFoundRedirects};
use crate::domain::models::VisibilitySpec;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for custom domains.
///
/// The default domain is configuration, not a row, so it never comes out of
/// this repository.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgDomainRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryDomainRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Finds a domain by its database ID.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Domain>, AppError>;

    /// Finds a domain by its authority (e.g. `"s.example.com"`).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_authority(&self, authority: &str) -> Result<Option<Domain>, AppError>;

    /// Lists stored domains other than `excluded_authority`, ordered by
    /// authority, restricted to the domain of `spec` when it has one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_domains_without(
        &self,
        excluded_authority: String,
        spec: Option<VisibilitySpec>,
    ) -> Result<Vec<Domain>, AppError>;

    /// Writes a domain, returning the stored row when the authority already
    /// exists. Concurrent calls for the same authority get the same domain.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn upsert(&self, new_domain: NewDomain) -> Result<Domain, AppError>;

    /// Overwrites the three "not found" redirects of a domain.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the domain does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    async fn save_redirects(
        &self,
        id: i64,
        redirects: NotFoundRedirects,
    ) -> Result<Domain, AppError>;
}
