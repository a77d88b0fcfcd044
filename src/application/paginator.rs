//! Offset pagination over repository-backed listings.
//!
//! A [`PaginatorAdapter`] knows how to fetch one slice of a listing and how
//! many items the whole listing has; [`Paginator::paginate`] turns a 1-based
//! page request into the right slice plus a [`PaginationInfo`] summary.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::entities::{ApiKey, ShortUrl};
use crate::domain::models::{ShortUrlsParams, VisibilitySpec};
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

/// Source of paginated items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaginatorAdapter<T: Send + Sync + 'static>: Send + Sync {
    /// Items starting at `offset`. `limit: None` means "until the end".
    async fn get_items(&self, offset: i64, limit: Option<i64>) -> Result<Vec<T>, AppError>;

    /// Total number of items across all pages.
    async fn count(&self) -> Result<i64, AppError>;
}

/// Summary of a paginated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    pub current_page: u32,
    pub pages_count: u32,
    /// Equals `total_items` when everything is returned on one page.
    pub items_per_page: u32,
    pub items_in_current_page: u32,
    pub total_items: u32,
}

/// One page of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

pub struct Paginator;

impl Paginator {
    /// Fetches page `page` (1-based, `0` is treated as `1`).
    ///
    /// `items_per_page: None` (or `Some(0)`) returns every item on a single page.
    ///
    /// # Errors
    ///
    /// Propagates adapter errors.
    pub async fn paginate<T, A>(
        adapter: &A,
        page: u32,
        items_per_page: Option<u32>,
    ) -> Result<Page<T>, AppError>
    where
        T: Send + Sync + 'static,
        A: PaginatorAdapter<T> + ?Sized,
    {
        let total_items = u32::try_from(adapter.count().await?.max(0)).unwrap_or(u32::MAX);

        let (current_page, per_page, items) = match items_per_page.filter(|n| *n > 0) {
            Some(per_page) => {
                let pages_count = total_items.div_ceil(per_page).max(1);
                let current_page = page.clamp(1, pages_count);
                let offset = i64::from(current_page - 1) * i64::from(per_page);
                let items = adapter
                    .get_items(offset, Some(i64::from(per_page)))
                    .await?;
                (current_page, per_page, items)
            }
            None => {
                let items = adapter.get_items(0, None).await?;
                (1, total_items, items)
            }
        };

        let pages_count = if per_page == 0 {
            1
        } else {
            total_items.div_ceil(per_page).max(1)
        };

        Ok(Page {
            pagination: PaginationInfo {
                current_page,
                pages_count,
                items_per_page: per_page,
                items_in_current_page: items.len() as u32,
                total_items,
            },
            items,
        })
    }
}

/// Adapts a short URL listing query to the [`PaginatorAdapter`] contract.
///
/// Every filter of `params` and the visibility of `api_key` are forwarded
/// unchanged to the repository.
pub struct ShortUrlRepositoryAdapter<R: ShortUrlRepository + ?Sized> {
    repository: Arc<R>,
    params: ShortUrlsParams,
    spec: Option<VisibilitySpec>,
}

impl<R: ShortUrlRepository + ?Sized> ShortUrlRepositoryAdapter<R> {
    pub fn new(repository: Arc<R>, params: ShortUrlsParams, api_key: Option<&ApiKey>) -> Self {
        Self {
            repository,
            params,
            spec: api_key.map(ApiKey::spec),
        }
    }
}

#[async_trait]
impl<R: ShortUrlRepository + ?Sized> PaginatorAdapter<ShortUrl> for ShortUrlRepositoryAdapter<R> {
    async fn get_items(&self, offset: i64, limit: Option<i64>) -> Result<Vec<ShortUrl>, AppError> {
        self.repository
            .find_list(
                limit,
                Some(offset),
                self.params.search_term().map(str::to_string),
                self.params.tags().to_vec(),
                self.params.order_by(),
                self.params.date_range(),
                self.spec,
            )
            .await
    }

    async fn count(&self) -> Result<i64, AppError> {
        self.repository
            .count_list(
                self.params.search_term().map(str::to_string),
                self.params.tags().to_vec(),
                self.params.date_range(),
                self.spec,
            )
            .await
    }
}
