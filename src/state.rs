//! Shared application state injected into every handler.

use std::sync::Arc;

use axum::http::StatusCode;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::application::services::{
    ApiKeyService, DomainService, RedirectService, ShortUrlService, VisitService,
};
use crate::config::Config;
use crate::domain::entities::NotFoundRedirects;
use crate::domain::repositories::{
    ApiKeyRepository, DomainRepository, ShortUrlRepository, VisitRepository,
};
use crate::domain::visit_event::VisitEvent;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::memory::{
    InMemoryApiKeyRepository, InMemoryDomainRepository, InMemoryShortUrlRepository,
    InMemoryVisitRepository,
};
use crate::infrastructure::persistence::{
    PgApiKeyRepository, PgDomainRepository, PgShortUrlRepository, PgVisitRepository,
};

pub type DynShortUrlService = ShortUrlService<dyn ShortUrlRepository, dyn DomainRepository>;
pub type DynDomainService = DomainService<dyn DomainRepository>;
pub type DynApiKeyService = ApiKeyService<dyn ApiKeyRepository>;
pub type DynVisitService = VisitService<dyn VisitRepository, dyn ShortUrlRepository>;
pub type DynRedirectService = RedirectService<dyn ShortUrlRepository, dyn DomainRepository>;

/// One handle per repository, all backed by the same storage.
#[derive(Clone)]
pub struct Repositories {
    pub short_urls: Arc<dyn ShortUrlRepository>,
    pub domains: Arc<dyn DomainRepository>,
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub visits: Arc<dyn VisitRepository>,
}

impl Repositories {
    pub fn postgres(pool: Arc<PgPool>) -> Self {
        Self {
            short_urls: Arc::new(PgShortUrlRepository::new(pool.clone())),
            domains: Arc::new(PgDomainRepository::new(pool.clone())),
            api_keys: Arc::new(PgApiKeyRepository::new(pool.clone())),
            visits: Arc::new(PgVisitRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let domains = Arc::new(InMemoryDomainRepository::new());

        Self {
            short_urls: Arc::new(InMemoryShortUrlRepository::new(domains.clone())),
            domains,
            api_keys: Arc::new(InMemoryApiKeyRepository::new()),
            visits: Arc::new(InMemoryVisitRepository::new()),
        }
    }
}

/// Shortener settings the services and handlers need at runtime.
#[derive(Debug, Clone)]
pub struct ShortenerOptions {
    pub default_domain: String,
    pub short_url_schema: String,
    pub default_short_codes_length: usize,
    pub redirect_status_code: u16,
    pub not_found_redirects: NotFoundRedirects,
    pub secret: String,
    pub behind_proxy: bool,
}

impl From<&Config> for ShortenerOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_domain: config.default_domain.clone(),
            short_url_schema: config.short_url_schema.clone(),
            default_short_codes_length: config.default_short_codes_length,
            redirect_status_code: config.redirect_status_code,
            not_found_redirects: config.not_found_redirects.clone(),
            secret: config.secret.clone(),
            behind_proxy: config.behind_proxy,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub short_url_service: Arc<DynShortUrlService>,
    pub domain_service: Arc<DynDomainService>,
    pub api_key_service: Arc<DynApiKeyService>,
    pub visit_service: Arc<DynVisitService>,
    pub redirect_service: Arc<DynRedirectService>,
    pub cache: Arc<dyn CacheService>,
    pub short_url_schema: String,
    pub redirect_status: StatusCode,
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires every service on top of `repositories`.
    pub fn new(
        repositories: &Repositories,
        cache: Arc<dyn CacheService>,
        visit_tx: mpsc::Sender<VisitEvent>,
        options: ShortenerOptions,
    ) -> Self {
        let domain_service: Arc<DynDomainService> = Arc::new(DomainService::new(
            repositories.domains.clone(),
            options.default_domain,
            options.not_found_redirects,
        ));

        let short_url_service = Arc::new(ShortUrlService::new(
            repositories.short_urls.clone(),
            domain_service.clone(),
            options.default_short_codes_length,
        ));

        let api_key_service = Arc::new(ApiKeyService::new(
            repositories.api_keys.clone(),
            options.secret,
        ));

        let visit_service = Arc::new(VisitService::new(
            repositories.visits.clone(),
            repositories.short_urls.clone(),
        ));

        let redirect_service = Arc::new(RedirectService::new(
            repositories.short_urls.clone(),
            domain_service.clone(),
            cache.clone(),
            visit_tx,
        ));

        let redirect_status = if options.redirect_status_code == 301 {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::FOUND
        };

        Self {
            short_url_service,
            domain_service,
            api_key_service,
            visit_service,
            redirect_service,
            cache,
            short_url_schema: options.short_url_schema,
            redirect_status,
            behind_proxy: options.behind_proxy,
        }
    }

    pub fn default_domain(&self) -> &str {
        self.domain_service.default_domain()
    }

    /// Public URL of a short code served from `domain` (or the default domain).
    pub fn short_url_for(&self, short_code: &str, domain: Option<&str>) -> String {
        format!(
            "{}://{}/{}",
            self.short_url_schema,
            domain.unwrap_or(self.default_domain()),
            short_code
        )
    }
}
