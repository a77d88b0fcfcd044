//! Listing parameters for short URLs.

use super::{DateRange, ShortUrlsOrdering};

pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

/// Filters, ordering and page selection for a short URL listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortUrlsParams {
    /// 1-based page number.
    pub page: u32,
    /// `None` returns every item on a single page.
    pub items_per_page: Option<u32>,
    pub search_term: Option<String>,
    pub tags: Vec<String>,
    pub order_by: Option<ShortUrlsOrdering>,
    pub date_range: Option<DateRange>,
}

impl Default for ShortUrlsParams {
    fn default() -> Self {
        Self {
            page: 1,
            items_per_page: Some(DEFAULT_ITEMS_PER_PAGE),
            search_term: None,
            tags: Vec::new(),
            order_by: None,
            date_range: None,
        }
    }
}

impl ShortUrlsParams {
    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn order_by(&self) -> Option<ShortUrlsOrdering> {
        self.order_by
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.date_range
    }
}
