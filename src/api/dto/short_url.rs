//! DTOs for the short URL endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::api::dto::pagination::{DateFilterParams, PageParams, PaginatedData};
use crate::domain::entities::{ShortUrl, ShortUrlEdit, ShortUrlMeta};
use crate::domain::models::{ShortUrlIdentifier, ShortUrlsOrdering, ShortUrlsParams};
use crate::error::AppError;
use crate::utils::code_generator::MIN_SHORT_CODE_LENGTH;
use crate::utils::tags::parse_tags_query;

/// Request body for `POST /api/short-urls`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateShortUrlRequest {
    #[validate(length(min = 1, message = "Long URL cannot be empty"))]
    pub long_url: String,

    pub custom_slug: Option<String>,

    /// Authority to serve the short URL from. Defaults to the default domain.
    pub domain: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[validate(length(max = 512))]
    pub title: Option<String>,

    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "Max visits must be at least 1"))]
    pub max_visits: Option<i64>,

    #[serde(default)]
    pub crawlable: bool,

    /// Return an existing equivalent short URL instead of creating a new one.
    #[serde(default)]
    pub find_if_exists: bool,

    #[validate(range(min = 4, max = 64))]
    pub short_code_length: Option<usize>,
}

impl CreateShortUrlRequest {
    pub fn into_meta(self) -> ShortUrlMeta {
        ShortUrlMeta {
            long_url: self.long_url,
            custom_slug: self.custom_slug.filter(|s| !s.trim().is_empty()),
            domain: self.domain,
            tags: self.tags,
            title: self.title.filter(|t| !t.trim().is_empty()),
            valid_since: self.valid_since,
            valid_until: self.valid_until,
            max_visits: self.max_visits,
            crawlable: self.crawlable,
            find_if_exists: self.find_if_exists,
            short_code_length: self
                .short_code_length
                .map(|l| l.max(MIN_SHORT_CODE_LENGTH)),
        }
    }
}

/// Request body for `PATCH /api/short-urls/{shortCode}`.
///
/// Only provided fields are changed. For nullable fields:
///
/// - **Absent** → leave the existing value unchanged
/// - **`null`** → clear the value
/// - **Value** → set it
#[derive(Debug, Deserialize, Validate)]
pub struct EditShortUrlRequest {
    #[validate(length(min = 1, message = "Long URL cannot be empty"))]
    pub long_url: Option<String>,

    pub tags: Option<Vec<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub title: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub valid_since: Option<Option<DateTime<Utc>>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub valid_until: Option<Option<DateTime<Utc>>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    pub max_visits: Option<Option<i64>>,

    pub crawlable: Option<bool>,
}

impl EditShortUrlRequest {
    pub fn into_edit(self) -> Result<ShortUrlEdit, AppError> {
        if let Some(Some(max)) = self.max_visits
            && max < 1
        {
            return Err(AppError::from_fields([(
                "max_visits",
                "Max visits must be at least 1",
            )]));
        }

        Ok(ShortUrlEdit {
            long_url: self.long_url,
            tags: self.tags,
            title: self.title,
            valid_since: self.valid_since,
            valid_until: self.valid_until,
            max_visits: self.max_visits,
            crawlable: self.crawlable,
        })
    }
}

/// Request body for `PUT /api/short-urls/{shortCode}/tags`.
#[derive(Debug, Deserialize)]
pub struct EditTagsRequest {
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct EditTagsResponse {
    pub tags: Vec<String>,
}

/// `?domain=` selector for endpoints addressing one short URL.
#[derive(Debug, Default, Deserialize)]
pub struct DomainQuery {
    pub domain: Option<String>,
}

impl DomainQuery {
    pub fn identifier(&self, short_code: String, default_domain: &str) -> ShortUrlIdentifier {
        ShortUrlIdentifier::from_api_request(short_code, self.domain.as_deref(), default_domain)
    }
}

/// Query parameters of `GET /api/short-urls`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ShortUrlsQuery {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub items_per_page: Option<i64>,

    pub search_term: Option<String>,

    /// Comma separated list of tags.
    pub tags: Option<String>,

    /// `field-ASC` or `field-DESC`.
    pub order_by: Option<String>,

    #[serde(flatten)]
    pub date_filter: DateFilterParams,
}

impl ShortUrlsQuery {
    pub fn into_params(self) -> Result<ShortUrlsParams, AppError> {
        let (page, items_per_page) = PageParams {
            page: self.page,
            items_per_page: self.items_per_page,
        }
        .resolve()?;

        let order_by = match self.order_by.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<ShortUrlsOrdering>().map_err(|e| {
                AppError::bad_request(
                    "Provided data is not valid",
                    serde_json::json!({ "invalid_elements": { "order_by": e } }),
                )
            })?),
        };

        Ok(ShortUrlsParams {
            page,
            items_per_page,
            search_term: self
                .search_term
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            tags: self.tags.as_deref().map(parse_tags_query).unwrap_or_default(),
            order_by,
            date_range: self.date_filter.date_range(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ShortUrlMetaResponse {
    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_visits: Option<i64>,
}

/// JSON representation of a short URL.
#[derive(Debug, Serialize)]
pub struct ShortUrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub date_created: DateTime<Utc>,
    pub visits_count: i64,
    pub tags: Vec<String>,
    pub meta: ShortUrlMetaResponse,
    /// `null` for the default domain.
    pub domain: Option<String>,
    pub title: Option<String>,
    pub crawlable: bool,
}

impl ShortUrlResponse {
    /// `short_url` is the full public URL, e.g. `https://s.example.com/abc12`.
    pub fn new(short_url: ShortUrl, public_url: String) -> Self {
        Self {
            short_code: short_url.short_code,
            short_url: public_url,
            long_url: short_url.long_url,
            date_created: short_url.created_at,
            visits_count: short_url.visits_count,
            tags: short_url.tags,
            meta: ShortUrlMetaResponse {
                valid_since: short_url.valid_since,
                valid_until: short_url.valid_until,
                max_visits: short_url.max_visits,
            },
            domain: short_url.domain,
            title: short_url.title,
            crawlable: short_url.crawlable,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShortUrlsListResponse {
    pub short_urls: PaginatedData<ShortUrlResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{OrderDirection, OrderField};

    #[test]
    fn test_query_into_params() {
        let query = ShortUrlsQuery {
            page: Some(2),
            items_per_page: Some(-1),
            search_term: Some("  docs ".to_string()),
            tags: Some("Foo, bar,,foo".to_string()),
            order_by: Some("visits-DESC".to_string()),
            date_filter: DateFilterParams::default(),
        };

        let params = query.into_params().unwrap();

        assert_eq!(params.page, 2);
        assert_eq!(params.items_per_page, None);
        assert_eq!(params.search_term.as_deref(), Some("docs"));
        assert_eq!(params.tags, vec!["foo", "bar"]);
        assert_eq!(
            params.order_by,
            Some(ShortUrlsOrdering::new(OrderField::Visits, OrderDirection::Desc))
        );
        assert!(params.date_range.is_none());
    }

    #[test]
    fn test_query_rejects_unknown_order_field() {
        let query = ShortUrlsQuery {
            order_by: Some("color-ASC".to_string()),
            ..Default::default()
        };

        let err = query.into_params().unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_edit_request_distinguishes_null_from_absent() {
        let edit: EditShortUrlRequest =
            serde_json::from_str(r#"{"title": null, "max_visits": 5}"#).unwrap();
        let edit = edit.into_edit().unwrap();

        assert_eq!(edit.title, Some(None));
        assert_eq!(edit.max_visits, Some(Some(5)));
        assert_eq!(edit.valid_until, None);
        assert_eq!(edit.long_url, None);
    }

    #[test]
    fn test_edit_request_rejects_zero_max_visits() {
        let edit: EditShortUrlRequest = serde_json::from_str(r#"{"max_visits": 0}"#).unwrap();
        assert!(edit.into_edit().is_err());
    }

    #[test]
    fn test_create_request_into_meta_drops_blank_values() {
        let request: CreateShortUrlRequest = serde_json::from_str(
            r#"{"long_url": "https://example.com", "custom_slug": " ", "title": ""}"#,
        )
        .unwrap();

        let meta = request.into_meta();

        assert_eq!(meta.long_url, "https://example.com");
        assert!(meta.custom_slug.is_none());
        assert!(meta.title.is_none());
        assert!(meta.tags.is_empty());
        assert!(!meta.find_if_exists);
    }
}
