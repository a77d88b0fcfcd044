//! PostgreSQL repository implementations.
//!
//! Concrete implementations of the domain repository traits using SQLx
//! runtime queries mapped through `FromRow` row types.
//!
//! # Repositories
//!
//! - [`PgShortUrlRepository`] - short URL listing, lookup and CRUD
//! - [`PgDomainRepository`] - custom domains and their redirects
//! - [`PgApiKeyRepository`] - API keys and their roles
//! - [`PgVisitRepository`] - visit recording and listing

pub mod pg_api_key_repository;
pub mod pg_domain_repository;
pub mod pg_short_url_repository;
pub mod pg_visit_repository;

pub use pg_api_key_repository::PgApiKeyRepository;
pub use pg_domain_repository::PgDomainRepository;
pub use pg_short_url_repository::PgShortUrlRepository;
pub use pg_visit_repository::PgVisitRepository;
