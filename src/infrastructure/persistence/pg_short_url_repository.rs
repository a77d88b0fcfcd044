//! PostgreSQL implementation of short URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlEdit, ShortUrlMeta};
use crate::domain::models::{DateRange, ShortUrlIdentifier, ShortUrlsOrdering, VisibilitySpec};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

const SHORT_URL_COLUMNS: &str = r#"
    s.id, s.short_code, s.long_url, d.authority AS domain, s.domain_id, s.tags, s.title,
    s.valid_since, s.valid_until, s.max_visits, s.crawlable, s.author_api_key_id,
    s.visits_count, s.created_at
"#;

#[derive(sqlx::FromRow)]
struct ShortUrlRow {
    id: i64,
    short_code: String,
    long_url: String,
    domain: Option<String>,
    domain_id: Option<i64>,
    tags: Vec<String>,
    title: Option<String>,
    valid_since: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    max_visits: Option<i64>,
    crawlable: bool,
    author_api_key_id: Option<i64>,
    visits_count: i64,
    created_at: DateTime<Utc>,
}

impl From<ShortUrlRow> for ShortUrl {
    fn from(r: ShortUrlRow) -> Self {
        ShortUrl {
            id: r.id,
            short_code: r.short_code,
            long_url: r.long_url,
            domain: r.domain,
            domain_id: r.domain_id,
            tags: r.tags,
            title: r.title,
            valid_since: r.valid_since,
            valid_until: r.valid_until,
            max_visits: r.max_visits,
            crawlable: r.crawlable,
            author_api_key_id: r.author_api_key_id,
            visits_count: r.visits_count,
            created_at: r.created_at,
        }
    }
}

/// PostgreSQL repository for short URLs.
///
/// Listings are assembled with [`QueryBuilder`] so that only the filters in
/// use end up in the statement. Tags are stored as a `TEXT[]` column.
pub struct PgShortUrlRepository {
    pool: Arc<PgPool>,
}

impl PgShortUrlRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn select() -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(format!(
            "SELECT {SHORT_URL_COLUMNS} FROM short_urls s LEFT JOIN domains d ON d.id = s.domain_id WHERE TRUE"
        ))
    }
}

fn push_identifier(qb: &mut QueryBuilder<'_, Postgres>, identifier: &ShortUrlIdentifier) {
    qb.push(" AND s.short_code = ")
        .push_bind(identifier.short_code.clone());

    match &identifier.domain {
        Some(authority) => {
            qb.push(" AND d.authority = ").push_bind(authority.clone());
        }
        None => {
            qb.push(" AND s.domain_id IS NULL");
        }
    }
}

fn push_spec(qb: &mut QueryBuilder<'_, Postgres>, spec: Option<VisibilitySpec>) {
    let Some(spec) = spec else {
        return;
    };

    if let Some(author) = spec.author_api_key_id {
        qb.push(" AND s.author_api_key_id = ").push_bind(author);
    }
    if let Some(domain_id) = spec.domain_id {
        qb.push(" AND s.domain_id = ").push_bind(domain_id);
    }
}

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    search_term: Option<String>,
    tags: Vec<String>,
    date_range: Option<DateRange>,
    spec: Option<VisibilitySpec>,
) {
    if let Some(term) = search_term.filter(|t| !t.trim().is_empty()) {
        let pattern = format!(
            "%{}%",
            term.trim()
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        );

        qb.push(" AND (s.long_url ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.short_code ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR d.authority ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if !tags.is_empty() {
        qb.push(" AND s.tags && ").push_bind(tags);
    }

    if let Some(range) = date_range {
        if let Some(start) = range.start {
            qb.push(" AND s.created_at >= ").push_bind(start);
        }
        if let Some(end) = range.end {
            qb.push(" AND s.created_at <= ").push_bind(end);
        }
    }

    push_spec(qb, spec);
}

#[async_trait]
impl ShortUrlRepository for PgShortUrlRepository {
    async fn find_list(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
        search_term: Option<String>,
        tags: Vec<String>,
        order_by: Option<ShortUrlsOrdering>,
        date_range: Option<DateRange>,
        spec: Option<VisibilitySpec>,
    ) -> Result<Vec<ShortUrl>, AppError> {
        let mut qb = Self::select();
        push_filters(&mut qb, search_term, tags, date_range, spec);

        let ordering = order_by.unwrap_or_default();
        qb.push(format!(
            " ORDER BY {} {} NULLS LAST, s.id DESC",
            ordering.field.column(),
            ordering.direction.as_sql()
        ));

        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = offset {
            qb.push(" OFFSET ").push_bind(offset);
        }

        let rows = qb
            .build_query_as::<ShortUrlRow>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(ShortUrl::from).collect())
    }

    async fn count_list(
        &self,
        search_term: Option<String>,
        tags: Vec<String>,
        date_range: Option<DateRange>,
        spec: Option<VisibilitySpec>,
    ) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM short_urls s LEFT JOIN domains d ON d.id = s.domain_id WHERE TRUE",
        );
        push_filters(&mut qb, search_term, tags, date_range, spec);

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn find_one_with_domain_fallback(
        &self,
        short_code: &str,
        domain: Option<String>,
    ) -> Result<Option<ShortUrl>, AppError> {
        // Rows on the requested domain sort before rows on the default domain.
        let sql = format!(
            r#"
            SELECT {SHORT_URL_COLUMNS}
            FROM short_urls s
            LEFT JOIN domains d ON d.id = s.domain_id
            WHERE s.short_code = $1
              AND (s.domain_id IS NULL OR d.authority = $2)
            ORDER BY (s.domain_id IS NULL) ASC
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(short_code)
            .bind(domain)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShortUrl::from))
    }

    async fn find_one(
        &self,
        identifier: &ShortUrlIdentifier,
        spec: Option<VisibilitySpec>,
    ) -> Result<Option<ShortUrl>, AppError> {
        let mut qb = Self::select();
        push_identifier(&mut qb, identifier);
        push_spec(&mut qb, spec);
        qb.push(" LIMIT 1");

        let row = qb
            .build_query_as::<ShortUrlRow>()
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShortUrl::from))
    }

    async fn short_code_is_in_use(
        &self,
        identifier: &ShortUrlIdentifier,
        spec: Option<VisibilitySpec>,
    ) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT EXISTS (SELECT 1 FROM short_urls s LEFT JOIN domains d ON d.id = s.domain_id WHERE TRUE",
        );
        push_identifier(&mut qb, identifier);
        push_spec(&mut qb, spec);
        qb.push(")");

        let exists = qb
            .build_query_scalar::<bool>()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(exists)
    }

    async fn find_one_matching(&self, meta: &ShortUrlMeta) -> Result<Option<ShortUrl>, AppError> {
        let mut qb = Self::select();
        qb.push(" AND s.long_url = ").push_bind(meta.long_url.clone());

        match &meta.domain {
            Some(authority) => {
                qb.push(" AND d.authority = ").push_bind(authority.clone());
            }
            None => {
                qb.push(" AND s.domain_id IS NULL");
            }
        }

        qb.push(" AND s.tags @> ")
            .push_bind(meta.tags.clone())
            .push(" AND s.tags <@ ")
            .push_bind(meta.tags.clone());

        if let Some(slug) = &meta.custom_slug {
            qb.push(" AND s.short_code = ").push_bind(slug.clone());
        }

        qb.push(" ORDER BY s.created_at DESC LIMIT 1");

        let row = qb
            .build_query_as::<ShortUrlRow>()
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(ShortUrl::from))
    }

    async fn find_crawlable_short_codes(&self) -> Result<Vec<String>, AppError> {
        let codes = sqlx::query_scalar::<_, String>(
            "SELECT short_code FROM short_urls WHERE crawlable ORDER BY short_code",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(codes)
    }

    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let sql = format!(
            r#"
            WITH s AS (
                INSERT INTO short_urls (
                    short_code, long_url, domain_id, tags, title, valid_since,
                    valid_until, max_visits, crawlable, author_api_key_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
            )
            SELECT {SHORT_URL_COLUMNS}
            FROM s
            LEFT JOIN domains d ON d.id = s.domain_id
            "#
        );

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(&new_short_url.short_code)
            .bind(&new_short_url.long_url)
            .bind(new_short_url.domain_id)
            .bind(&new_short_url.tags)
            .bind(&new_short_url.title)
            .bind(new_short_url.valid_since)
            .bind(new_short_url.valid_until)
            .bind(new_short_url.max_visits)
            .bind(new_short_url.crawlable)
            .bind(new_short_url.author_api_key_id)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict { .. } => AppError::conflict(
                    format!(
                        "Provided slug \"{}\" is already in use",
                        new_short_url.short_code
                    ),
                    json!({ "custom_slug": new_short_url.short_code }),
                ),
                other => other,
            })?;

        Ok(row.into())
    }

    async fn update(&self, id: i64, edit: ShortUrlEdit) -> Result<ShortUrl, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            SELECT {SHORT_URL_COLUMNS}
            FROM short_urls s
            LEFT JOIN domains d ON d.id = s.domain_id
            WHERE s.id = $1
            FOR UPDATE OF s
            "#
        );

        let row = sqlx::query_as::<_, ShortUrlRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short URL not found", json!({ "id": id }))
            })?;

        let mut short_url = ShortUrl::from(row);
        short_url.apply(edit);

        sqlx::query(
            r#"
            UPDATE short_urls
            SET long_url = $2, tags = $3, title = $4, valid_since = $5,
                valid_until = $6, max_visits = $7, crawlable = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&short_url.long_url)
        .bind(&short_url.tags)
        .bind(&short_url.title)
        .bind(short_url.valid_since)
        .bind(short_url.valid_until)
        .bind(short_url.max_visits)
        .bind(short_url.crawlable)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(short_url)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_urls WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_visits(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE short_urls SET visits_count = visits_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn list_tags(&self, spec: Option<VisibilitySpec>) -> Result<Vec<String>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT DISTINCT t.tag FROM short_urls s CROSS JOIN LATERAL unnest(s.tags) AS t(tag) WHERE TRUE",
        );
        push_spec(&mut qb, spec);
        qb.push(" ORDER BY t.tag");

        let tags = qb
            .build_query_scalar::<String>()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(tags)
    }
}
