//! Repository trait for visits.

use crate::domain::entities::{NewVisit, Visit};
use crate::domain::models::DateRange;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for recording and querying visits.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgVisitRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryVisitRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Records a visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn record(&self, visit: NewVisit) -> Result<Visit, AppError>;

    /// Visits of one short URL, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_short_url(
        &self,
        short_url_id: i64,
        date_range: Option<DateRange>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Visit>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_by_short_url(
        &self,
        short_url_id: i64,
        date_range: Option<DateRange>,
    ) -> Result<i64, AppError>;

    /// Visits not attached to any short URL, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_orphans(
        &self,
        date_range: Option<DateRange>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Visit>, AppError>;

    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_orphans(&self, date_range: Option<DateRange>) -> Result<i64, AppError>;
}
