//! Business logic services for the application layer.

pub mod api_key_service;
pub mod domain_service;
pub mod redirect_service;
pub mod short_url_service;
pub mod visit_service;

pub use api_key_service::ApiKeyService;
pub use domain_service::DomainService;
pub use redirect_service::RedirectService;
pub use short_url_service::ShortUrlService;
pub use visit_service::VisitService;
