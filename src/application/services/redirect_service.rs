//! Resolution of public redirect requests.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::application::services::DomainService;
use crate::domain::entities::{NotFoundRedirects, VisitType};
use crate::domain::models::ShortUrlIdentifier;
use crate::domain::repositories::{DomainRepository, ShortUrlRepository};
use crate::domain::visit_event::VisitEvent;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, CachedRedirect};

/// Resolves `/{shortCode}` requests and the "not found" fallbacks.
///
/// Lookups go through the redirect cache first. Visits are queued for the
/// background worker and dropped when the queue is full.
pub struct RedirectService<S, D>
where
    S: ShortUrlRepository + ?Sized,
    D: DomainRepository + ?Sized,
{
    short_urls: Arc<S>,
    domain_service: Arc<DomainService<D>>,
    cache: Arc<dyn CacheService>,
    visit_tx: mpsc::Sender<VisitEvent>,
}

impl<S, D> RedirectService<S, D>
where
    S: ShortUrlRepository + ?Sized,
    D: DomainRepository + ?Sized,
{
    pub fn new(
        short_urls: Arc<S>,
        domain_service: Arc<DomainService<D>>,
        cache: Arc<dyn CacheService>,
        visit_tx: mpsc::Sender<VisitEvent>,
    ) -> Self {
        Self {
            short_urls,
            domain_service,
            cache,
            visit_tx,
        }
    }

    /// Finds the enabled short URL served at `authority/short_code`.
    ///
    /// A code missing on a custom domain falls back to the default domain.
    /// Disabled short URLs (outside their validity window or out of visits)
    /// resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn resolve(
        &self,
        authority: &str,
        short_code: &str,
    ) -> Result<Option<CachedRedirect>, AppError> {
        let default_domain = self.domain_service.default_domain();
        let identifier =
            ShortUrlIdentifier::from_api_request(short_code, Some(authority), default_domain);
        let key = identifier.cache_key(default_domain);
        let now = Utc::now();

        if let Ok(Some(cached)) = self.cache.get_redirect(&key).await {
            return Ok(cached.is_enabled_at(now).then_some(cached));
        }

        let short_url = self
            .short_urls
            .find_one_with_domain_fallback(short_code, identifier.domain.clone())
            .await?
            .filter(|s| s.is_enabled_at(now));

        let Some(short_url) = short_url else {
            return Ok(None);
        };

        // Only cache under the short URL's own key, the one invalidation clears.
        let served_from_own_domain = short_url.domain == identifier.domain;

        match CachedRedirect::from_short_url(&short_url) {
            Some(cached) => {
                if served_from_own_domain {
                    if let Err(e) = self.cache.set_redirect(&key, &cached, None).await {
                        tracing::warn!("Failed to cache redirect {}: {}", key, e);
                    }
                }
                Ok(Some(cached))
            }
            None => Ok(Some(CachedRedirect {
                short_url_id: short_url.id,
                long_url: short_url.long_url,
                valid_since: short_url.valid_since,
                valid_until: short_url.valid_until,
            })),
        }
    }

    /// Target for a request that did not resolve to a short URL.
    ///
    /// The redirect configured on the requested domain wins; otherwise the
    /// default redirects from configuration apply. `None` means plain 404.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn not_found_redirect(
        &self,
        authority: &str,
        visit_type: VisitType,
    ) -> Result<Option<String>, AppError> {
        let domain_redirects = if authority.eq_ignore_ascii_case(self.domain_service.default_domain())
        {
            None
        } else {
            self.domain_service
                .find_by_authority(authority, None)
                .await?
                .map(|d| d.redirects)
        };

        let pick = |redirects: &NotFoundRedirects| -> Option<String> {
            match visit_type {
                VisitType::BaseUrl => redirects.base_url_redirect.clone(),
                VisitType::Regular404 => redirects.regular_404_redirect.clone(),
                VisitType::InvalidShortUrl => redirects.invalid_short_url_redirect.clone(),
                VisitType::Valid => None,
            }
        };

        Ok(domain_redirects
            .as_ref()
            .and_then(|r| pick(r))
            .or_else(|| pick(self.domain_service.default_redirects())))
    }

    /// Drops the cached redirect of a short URL after it was created, edited
    /// or deleted.
    pub async fn invalidate(&self, identifier: &ShortUrlIdentifier) {
        let key = identifier.cache_key(self.domain_service.default_domain());

        if let Err(e) = self.cache.invalidate(&key).await {
            tracing::warn!("Failed to invalidate cached redirect {}: {}", key, e);
        }
    }

    /// Queues a visit without waiting. Returns `false` if it was dropped.
    pub fn track(&self, event: VisitEvent) -> bool {
        match self.visit_tx.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Visit dropped: {}", e);
                metrics::counter!("urlkeeper_visits_dropped_total").increment(1);
                false
            }
        }
    }

    /// Free slots in the visit queue.
    pub fn visit_queue_capacity(&self) -> usize {
        self.visit_tx.capacity()
    }

    pub fn is_visit_queue_closed(&self) -> bool {
        self.visit_tx.is_closed()
    }
}
