//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access. Implementations live in
//! `crate::infrastructure::persistence` (PostgreSQL) and
//! `crate::infrastructure::memory` (in-process). Mock implementations are
//! generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`ShortUrlRepository`] - short URL listing, lookup and CRUD
//! - [`DomainRepository`] - custom domains and their redirects
//! - [`ApiKeyRepository`] - API key storage
//! - [`VisitRepository`] - visit tracking

pub mod api_key_repository;
pub mod domain_repository;
pub mod short_url_repository;
pub mod visit_repository;

pub use api_key_repository::ApiKeyRepository;
pub use domain_repository::DomainRepository;
pub use short_url_repository::ShortUrlRepository;
pub use visit_repository::VisitRepository;

#[cfg(test)]
pub use api_key_repository::MockApiKeyRepository;
#[cfg(test)]
pub use domain_repository::MockDomainRepository;
#[cfg(test)]
pub use short_url_repository::MockShortUrlRepository;
#[cfg(test)]
pub use visit_repository::MockVisitRepository;
