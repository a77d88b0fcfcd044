//! In-process repository implementations.
//!
//! Used by `STORAGE=memory` and by the HTTP integration tests. State lives
//! for the lifetime of the process.

pub mod api_key_repository;
pub mod domain_repository;
pub mod short_url_repository;
pub mod visit_repository;

pub use api_key_repository::InMemoryApiKeyRepository;
pub use domain_repository::InMemoryDomainRepository;
pub use short_url_repository::InMemoryShortUrlRepository;
pub use visit_repository::InMemoryVisitRepository;
