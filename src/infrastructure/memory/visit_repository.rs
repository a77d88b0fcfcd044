//! In-memory implementation of visit repository.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entities::{NewVisit, Visit};
use crate::domain::models::DateRange;
use crate::domain::repositories::VisitRepository;
use crate::error::AppError;

#[derive(Default)]
pub struct InMemoryVisitRepository {
    visits: RwLock<Vec<Visit>>,
}

impl InMemoryVisitRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select<F>(
        &self,
        predicate: F,
        date_range: Option<DateRange>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Vec<Visit>
    where
        F: Fn(&Visit) -> bool,
    {
        let visits = self.visits.read().await;
        let offset = usize::try_from(offset.unwrap_or(0)).unwrap_or(0);
        let limit = limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);

        // Stored in insertion order, so reversing gives newest first.
        visits
            .iter()
            .rev()
            .filter(|v| predicate(v))
            .filter(|v| date_range.is_none_or(|r| r.contains(v.visited_at)))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl VisitRepository for InMemoryVisitRepository {
    async fn record(&self, visit: NewVisit) -> Result<Visit, AppError> {
        let mut visits = self.visits.write().await;

        let visit = Visit {
            id: visits.len() as i64 + 1,
            short_url_id: visit.short_url_id,
            visit_type: visit.visit_type,
            visited_url: visit.visited_url,
            referer: visit.referer,
            user_agent: visit.user_agent,
            remote_addr: visit.remote_addr,
            visited_at: Utc::now(),
        };
        visits.push(visit.clone());

        Ok(visit)
    }

    async fn find_by_short_url(
        &self,
        short_url_id: i64,
        date_range: Option<DateRange>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Visit>, AppError> {
        Ok(self
            .select(
                |v| v.short_url_id == Some(short_url_id),
                date_range,
                limit,
                offset,
            )
            .await)
    }

    async fn count_by_short_url(
        &self,
        short_url_id: i64,
        date_range: Option<DateRange>,
    ) -> Result<i64, AppError> {
        let visits = self
            .select(|v| v.short_url_id == Some(short_url_id), date_range, None, None)
            .await;

        Ok(visits.len() as i64)
    }

    async fn find_orphans(
        &self,
        date_range: Option<DateRange>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Visit>, AppError> {
        Ok(self
            .select(|v| v.short_url_id.is_none(), date_range, limit, offset)
            .await)
    }

    async fn count_orphans(&self, date_range: Option<DateRange>) -> Result<i64, AppError> {
        let visits = self
            .select(|v| v.short_url_id.is_none(), date_range, None, None)
            .await;

        Ok(visits.len() as i64)
    }
}
