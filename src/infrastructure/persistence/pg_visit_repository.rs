//! PostgreSQL implementation of visit repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::ipnetwork::IpNetwork;
use std::net::IpAddr;
use std::sync::Arc;

use crate::domain::entities::{NewVisit, Visit, VisitType};
use crate::domain::models::DateRange;
use crate::domain::repositories::VisitRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct VisitRow {
    id: i64,
    short_url_id: Option<i64>,
    visit_type: String,
    visited_url: Option<String>,
    referer: Option<String>,
    user_agent: Option<String>,
    remote_addr: Option<IpNetwork>,
    visited_at: DateTime<Utc>,
}

impl TryFrom<VisitRow> for Visit {
    type Error = AppError;

    fn try_from(r: VisitRow) -> Result<Self, Self::Error> {
        let visit_type = r.visit_type.parse::<VisitType>().map_err(|e| {
            tracing::error!(visit_id = r.id, error = %e, "Corrupted visit row");
            AppError::internal("Database error", json!({}))
        })?;

        Ok(Visit {
            id: r.id,
            short_url_id: r.short_url_id,
            visit_type,
            visited_url: r.visited_url,
            referer: r.referer,
            user_agent: r.user_agent,
            remote_addr: r.remote_addr.map(|ip| ip.ip().to_string()),
            visited_at: r.visited_at,
        })
    }
}

fn into_visits(rows: Vec<VisitRow>) -> Result<Vec<Visit>, AppError> {
    rows.into_iter().map(Visit::try_from).collect()
}

fn bounds(date_range: Option<DateRange>) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let range = date_range.unwrap_or_default();
    (range.start, range.end)
}

/// PostgreSQL repository for visits.
///
/// Remote addresses are stored as `INET`. Addresses that do not parse are
/// dropped rather than rejecting the visit.
pub struct PgVisitRepository {
    pool: Arc<PgPool>,
}

impl PgVisitRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitRepository for PgVisitRepository {
    async fn record(&self, visit: NewVisit) -> Result<Visit, AppError> {
        let remote_addr = visit
            .remote_addr
            .as_deref()
            .and_then(|addr| addr.parse::<IpAddr>().ok())
            .map(IpNetwork::from);

        let row = sqlx::query_as::<_, VisitRow>(
            r#"
            INSERT INTO visits (short_url_id, visit_type, visited_url, referer, user_agent, remote_addr)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, short_url_id, visit_type, visited_url, referer, user_agent, remote_addr, visited_at
            "#,
        )
        .bind(visit.short_url_id)
        .bind(visit.visit_type.as_str())
        .bind(visit.visited_url)
        .bind(visit.referer)
        .bind(visit.user_agent)
        .bind(remote_addr)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_short_url(
        &self,
        short_url_id: i64,
        date_range: Option<DateRange>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Visit>, AppError> {
        let (from, to) = bounds(date_range);

        let rows = sqlx::query_as::<_, VisitRow>(
            r#"
            SELECT id, short_url_id, visit_type, visited_url, referer, user_agent, remote_addr, visited_at
            FROM visits
            WHERE short_url_id = $1
              AND ($2::timestamptz IS NULL OR visited_at >= $2)
              AND ($3::timestamptz IS NULL OR visited_at <= $3)
            ORDER BY visited_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(short_url_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset.unwrap_or(0))
        .fetch_all(self.pool.as_ref())
        .await?;

        into_visits(rows)
    }

    async fn count_by_short_url(
        &self,
        short_url_id: i64,
        date_range: Option<DateRange>,
    ) -> Result<i64, AppError> {
        let (from, to) = bounds(date_range);

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM visits
            WHERE short_url_id = $1
              AND ($2::timestamptz IS NULL OR visited_at >= $2)
              AND ($3::timestamptz IS NULL OR visited_at <= $3)
            "#,
        )
        .bind(short_url_id)
        .bind(from)
        .bind(to)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn find_orphans(
        &self,
        date_range: Option<DateRange>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Visit>, AppError> {
        let (from, to) = bounds(date_range);

        let rows = sqlx::query_as::<_, VisitRow>(
            r#"
            SELECT id, short_url_id, visit_type, visited_url, referer, user_agent, remote_addr, visited_at
            FROM visits
            WHERE short_url_id IS NULL
              AND ($1::timestamptz IS NULL OR visited_at >= $1)
              AND ($2::timestamptz IS NULL OR visited_at <= $2)
            ORDER BY visited_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset.unwrap_or(0))
        .fetch_all(self.pool.as_ref())
        .await?;

        into_visits(rows)
    }

    async fn count_orphans(&self, date_range: Option<DateRange>) -> Result<i64, AppError> {
        let (from, to) = bounds(date_range);

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM visits
            WHERE short_url_id IS NULL
              AND ($1::timestamptz IS NULL OR visited_at >= $1)
              AND ($2::timestamptz IS NULL OR visited_at <= $2)
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
