//! Repository trait for short URL data access.

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlEdit, ShortUrlMeta};
use crate::domain::models::{DateRange, ShortUrlIdentifier, ShortUrlsOrdering, VisibilitySpec};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short URLs.
///
/// Every filtering rule of a listing lives behind this trait: the search term
/// matches long URL, short code, title or domain (case-insensitive), the tag
/// filter keeps short URLs carrying any of the given tags, the date range
/// bounds `created_at` inclusively and the [`VisibilitySpec`] restricts by
/// author API key and/or domain.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgShortUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryShortUrlRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortUrlRepository: Send + Sync {
    /// Lists short URLs matching the filters.
    ///
    /// `limit: None` returns every match. Without `order_by` the newest short
    /// URLs come first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    #[allow(clippy::too_many_arguments)]
    async fn find_list(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
        search_term: Option<String>,
        tags: Vec<String>,
        order_by: Option<ShortUrlsOrdering>,
        date_range: Option<DateRange>,
        spec: Option<VisibilitySpec>,
    ) -> Result<Vec<ShortUrl>, AppError>;

    /// Counts short URLs matching the same filters as [`Self::find_list`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_list(
        &self,
        search_term: Option<String>,
        tags: Vec<String>,
        date_range: Option<DateRange>,
        spec: Option<VisibilitySpec>,
    ) -> Result<i64, AppError>;

    /// Finds a short URL by code on `domain`, falling back to the default
    /// domain when nothing matches there.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_one_with_domain_fallback(
        &self,
        short_code: &str,
        domain: Option<String>,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Finds a short URL by its identifier, restricted by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_one(
        &self,
        identifier: &ShortUrlIdentifier,
        spec: Option<VisibilitySpec>,
    ) -> Result<Option<ShortUrl>, AppError>;

    /// Returns true if the identifier is already taken.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn short_code_is_in_use(
        &self,
        identifier: &ShortUrlIdentifier,
        spec: Option<VisibilitySpec>,
    ) -> Result<bool, AppError>;

    /// Finds an existing short URL equivalent to `meta`: same long URL, same
    /// domain, same tag set and, when given, same custom slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_one_matching(&self, meta: &ShortUrlMeta) -> Result<Option<ShortUrl>, AppError>;

    /// Short codes of every crawlable short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_crawlable_short_codes(&self) -> Result<Vec<String>, AppError>;

    /// Inserts a short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is taken on that domain.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError>;

    /// Applies a partial edit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no short URL has this id.
    /// Returns [`AppError::Internal`] on database errors.
    async fn update(&self, id: i64, edit: ShortUrlEdit) -> Result<ShortUrl, AppError>;

    /// Deletes a short URL and its visits. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Increments the denormalized visit counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn increment_visits(&self, id: i64) -> Result<(), AppError>;

    /// Distinct tags of the short URLs visible through `spec`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_tags(&self, spec: Option<VisibilitySpec>) -> Result<Vec<String>, AppError>;
}
