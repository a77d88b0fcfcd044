//! DTOs for domain endpoints.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::api::dto::pagination::DataList;
use crate::domain::entities::{Domain, DomainItem, NotFoundRedirects};

/// JSON representation of a domain listing entry.
#[derive(Debug, Serialize)]
pub struct DomainResponse {
    pub domain: String,
    pub is_default: bool,
    pub redirects: NotFoundRedirects,
}

impl From<DomainItem> for DomainResponse {
    fn from(item: DomainItem) -> Self {
        let is_default = item.is_default();
        match item {
            DomainItem::Default {
                authority,
                redirects,
            }
            | DomainItem::Existing {
                authority,
                redirects,
                ..
            } => Self {
                domain: authority,
                is_default,
                redirects,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DomainsResponse {
    pub domains: DataList<DomainResponse>,
}

/// Request body for `PATCH /api/domains/redirects`.
///
/// Every redirect omitted or `null` is cleared.
#[derive(Debug, Deserialize, Validate)]
pub struct DomainRedirectsRequest {
    #[validate(length(min = 1, max = 255, message = "Domain cannot be empty"))]
    pub domain: String,

    #[validate(custom(function = "blank_or_url"))]
    pub base_url_redirect: Option<String>,

    #[validate(custom(function = "blank_or_url"))]
    pub regular_404_redirect: Option<String>,

    #[validate(custom(function = "blank_or_url"))]
    pub invalid_short_url_redirect: Option<String>,
}

/// An empty value clears the redirect, anything else must be an absolute URL.
fn blank_or_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || url::Url::parse(value).is_ok() {
        return Ok(());
    }

    Err(ValidationError::new("url").with_message("Invalid URL format".into()))
}

impl DomainRedirectsRequest {
    pub fn redirects(&self) -> NotFoundRedirects {
        let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        NotFoundRedirects::new(
            non_blank(&self.base_url_redirect),
            non_blank(&self.regular_404_redirect),
            non_blank(&self.invalid_short_url_redirect),
        )
    }
}

#[derive(Debug, Serialize)]
pub struct DomainRedirectsResponse {
    pub domain: String,
    #[serde(flatten)]
    pub redirects: NotFoundRedirects,
}

impl From<Domain> for DomainRedirectsResponse {
    fn from(domain: Domain) -> Self {
        Self {
            domain: domain.authority,
            redirects: domain.redirects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_domain_item_json_shape() {
        let item = DomainItem::for_default_domain("s.test", &NotFoundRedirects::default());
        let value = serde_json::to_value(DomainResponse::from(item)).unwrap();

        assert_eq!(
            value,
            json!({
                "domain": "s.test",
                "is_default": true,
                "redirects": {
                    "base_url_redirect": null,
                    "regular_404_redirect": null,
                    "invalid_short_url_redirect": null
                }
            })
        );
    }

    #[test]
    fn test_redirects_request_blank_values_are_cleared() {
        let request: DomainRedirectsRequest = serde_json::from_str(
            r#"{"domain": "foo.com", "base_url_redirect": "", "regular_404_redirect": "https://a.b"}"#,
        )
        .unwrap();

        let redirects = request.redirects();
        assert!(redirects.base_url_redirect.is_none());
        assert_eq!(redirects.regular_404_redirect.as_deref(), Some("https://a.b"));
        assert!(redirects.invalid_short_url_redirect.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_redirects_request_rejects_relative_url() {
        let request: DomainRedirectsRequest =
            serde_json::from_str(r#"{"domain": "foo.com", "base_url_redirect": "/home"}"#).unwrap();

        assert!(request.validate().is_err());
    }
}
