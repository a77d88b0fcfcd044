//! Pagination and date filtering query parameters shared by listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::application::paginator::{Page, PaginationInfo};
use crate::domain::models::{DEFAULT_ITEMS_PER_PAGE, DateRange};
use crate::error::AppError;

/// Page selection query parameters.
///
/// Uses `serde_with` to parse numbers from query strings, which keeps them
/// working inside `#[serde(flatten)]`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    /// `-1` returns every item on a single page.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub items_per_page: Option<i64>,
}

impl PageParams {
    /// Validates the parameters into `(page, items_per_page)`.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `items_per_page`: 10
    pub fn resolve(&self) -> Result<(u32, Option<u32>), AppError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::from_fields([(
                "page",
                "Page must be greater than 0",
            )]));
        }

        let items_per_page = match self.items_per_page {
            None => Some(DEFAULT_ITEMS_PER_PAGE),
            Some(-1) => None,
            Some(n) if (1..=1000).contains(&n) => Some(n as u32),
            Some(_) => {
                return Err(AppError::from_fields([(
                    "items_per_page",
                    "Items per page must be between 1 and 1000, or -1 for all",
                )]));
            }
        };

        Ok((page, items_per_page))
    }
}

/// Date range filtering parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DateFilterParams {
    #[serde(default, with = "optional_rfc3339")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, with = "optional_rfc3339")]
    pub end_date: Option<DateTime<Utc>>,
}

impl DateFilterParams {
    pub fn date_range(&self) -> Option<DateRange> {
        DateRange::new(self.start_date, self.end_date).non_empty()
    }
}

/// Custom Serde deserializer for RFC3339 datetime strings.
mod optional_rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

/// `{"data": [...], "pagination": {...}}` envelope of a listing.
#[derive(Debug, Serialize)]
pub struct PaginatedData<T> {
    pub data: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> PaginatedData<T> {
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let page = page.map(f);
        Self {
            data: page.items,
            pagination: page.pagination,
        }
    }
}

/// `{"data": [...]}` envelope of an unpaginated listing.
#[derive(Debug, Serialize)]
pub struct DataList<T> {
    pub data: Vec<T>,
}
