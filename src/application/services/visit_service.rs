//! Visit listings.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::application::paginator::{Page, PaginatorAdapter, Paginator};
use crate::application::services::short_url_service::short_url_not_found;
use crate::domain::entities::{ApiKey, Visit};
use crate::domain::models::{DateRange, ShortUrlIdentifier};
use crate::domain::repositories::{ShortUrlRepository, VisitRepository};
use crate::error::AppError;

/// Service exposing recorded visits.
///
/// Recording itself happens in [`crate::domain::visit_worker`].
pub struct VisitService<V, S>
where
    V: VisitRepository + ?Sized,
    S: ShortUrlRepository + ?Sized,
{
    visits: Arc<V>,
    short_urls: Arc<S>,
}

impl<V, S> VisitService<V, S>
where
    V: VisitRepository + ?Sized,
    S: ShortUrlRepository + ?Sized,
{
    pub fn new(visits: Arc<V>, short_urls: Arc<S>) -> Self {
        Self { visits, short_urls }
    }

    /// Visits of one short URL visible to `api_key`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no visible short URL matches.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn visits_for_short_url(
        &self,
        identifier: &ShortUrlIdentifier,
        date_range: Option<DateRange>,
        page: u32,
        items_per_page: Option<u32>,
        api_key: Option<&ApiKey>,
    ) -> Result<Page<Visit>, AppError> {
        let short_url = self
            .short_urls
            .find_one(identifier, api_key.map(ApiKey::spec))
            .await?
            .ok_or_else(|| short_url_not_found(identifier))?;

        let adapter = ShortUrlVisitsAdapter {
            repository: self.visits.clone(),
            short_url_id: short_url.id,
            date_range,
        };

        Paginator::paginate(&adapter, page, items_per_page).await
    }

    /// Visits that did not match any short URL, newest first.
    ///
    /// Only admin keys may read them since they are not tied to any domain
    /// or author.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] for restricted keys.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn orphan_visits(
        &self,
        date_range: Option<DateRange>,
        page: u32,
        items_per_page: Option<u32>,
        api_key: Option<&ApiKey>,
    ) -> Result<Page<Visit>, AppError> {
        if api_key.is_some_and(|k| !k.is_admin()) {
            return Err(AppError::forbidden(
                "This API key cannot access orphan visits",
                json!({ "required_role": "admin" }),
            ));
        }

        let adapter = OrphanVisitsAdapter {
            repository: self.visits.clone(),
            date_range,
        };

        Paginator::paginate(&adapter, page, items_per_page).await
    }
}

struct ShortUrlVisitsAdapter<V: VisitRepository + ?Sized> {
    repository: Arc<V>,
    short_url_id: i64,
    date_range: Option<DateRange>,
}

#[async_trait]
impl<V: VisitRepository + ?Sized> PaginatorAdapter<Visit> for ShortUrlVisitsAdapter<V> {
    async fn get_items(&self, offset: i64, limit: Option<i64>) -> Result<Vec<Visit>, AppError> {
        self.repository
            .find_by_short_url(self.short_url_id, self.date_range, limit, Some(offset))
            .await
    }

    async fn count(&self) -> Result<i64, AppError> {
        self.repository
            .count_by_short_url(self.short_url_id, self.date_range)
            .await
    }
}

struct OrphanVisitsAdapter<V: VisitRepository + ?Sized> {
    repository: Arc<V>,
    date_range: Option<DateRange>,
}

#[async_trait]
impl<V: VisitRepository + ?Sized> PaginatorAdapter<Visit> for OrphanVisitsAdapter<V> {
    async fn get_items(&self, offset: i64, limit: Option<i64>) -> Result<Vec<Visit>, AppError> {
        self.repository
            .find_orphans(self.date_range, limit, Some(offset))
            .await
    }

    async fn count(&self) -> Result<i64, AppError> {
        self.repository.count_orphans(self.date_range).await
    }
}
