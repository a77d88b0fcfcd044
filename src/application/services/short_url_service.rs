//! Short URL creation, listing and edition.

use std::sync::Arc;

use serde_json::json;

use crate::application::paginator::{Page, Paginator, ShortUrlRepositoryAdapter};
use crate::application::services::DomainService;
use crate::domain::entities::{ApiKey, NewShortUrl, ShortUrl, ShortUrlEdit, ShortUrlMeta};
use crate::domain::models::{ShortUrlIdentifier, ShortUrlsParams};
use crate::domain::repositories::{DomainRepository, ShortUrlRepository};
use crate::error::AppError;
use crate::utils::code_generator::{generate_short_code, validate_custom_slug};
use crate::utils::tags::normalize_tags;
use crate::utils::url_normalizer::normalize_url;

const MAX_CODE_ATTEMPTS: usize = 10;

/// Service for short URLs.
///
/// Every operation taking an `api_key` restricts itself to the short URLs
/// that key can see.
pub struct ShortUrlService<S, D>
where
    S: ShortUrlRepository + ?Sized,
    D: DomainRepository + ?Sized,
{
    repository: Arc<S>,
    domain_service: Arc<DomainService<D>>,
    default_short_code_length: usize,
}

impl<S, D> ShortUrlService<S, D>
where
    S: ShortUrlRepository + ?Sized,
    D: DomainRepository + ?Sized,
{
    pub fn new(
        repository: Arc<S>,
        domain_service: Arc<DomainService<D>>,
        default_short_code_length: usize,
    ) -> Self {
        Self {
            repository,
            domain_service,
            default_short_code_length,
        }
    }

    pub fn default_domain(&self) -> &str {
        self.domain_service.default_domain()
    }

    /// Lists one page of short URLs.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_short_urls(
        &self,
        params: ShortUrlsParams,
        api_key: Option<&ApiKey>,
    ) -> Result<Page<ShortUrl>, AppError> {
        let page = params.page;
        let items_per_page = params.items_per_page;
        let adapter = ShortUrlRepositoryAdapter::new(self.repository.clone(), params, api_key);

        Paginator::paginate(&adapter, page, items_per_page).await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no visible short URL matches.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_short_url(
        &self,
        identifier: &ShortUrlIdentifier,
        api_key: Option<&ApiKey>,
    ) -> Result<ShortUrl, AppError> {
        self.repository
            .find_one(identifier, api_key.map(ApiKey::spec))
            .await?
            .ok_or_else(|| short_url_not_found(identifier))
    }

    /// Creates a short URL.
    ///
    /// A domain-specific key always creates on its own domain. With
    /// `find_if_exists`, an equivalent short URL is returned instead of a new one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid long URL, slug or limits.
    /// Returns [`AppError::Conflict`] if the custom slug is already in use.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn create_short_url(
        &self,
        mut meta: ShortUrlMeta,
        api_key: Option<&ApiKey>,
    ) -> Result<ShortUrl, AppError> {
        meta.long_url = normalize_long_url(&meta.long_url)?;
        meta.tags = normalize_tags(&meta.tags);
        validate_limits(meta.max_visits, meta.valid_since, meta.valid_until)?;

        let requested_domain = api_key
            .and_then(ApiKey::domain_authority)
            .map(str::to_string)
            .or(meta.domain.take());
        meta.domain = ShortUrlIdentifier::from_api_request(
            "",
            requested_domain.as_deref(),
            self.default_domain(),
        )
        .domain;

        if meta.find_if_exists
            && let Some(existing) = self.repository.find_one_matching(&meta).await?
        {
            return Ok(existing);
        }

        let short_code = match meta.custom_slug.as_deref() {
            Some(slug) => {
                let slug = slug.trim();
                validate_custom_slug(slug)?;
                let identifier = ShortUrlIdentifier::new(slug, meta.domain.clone());

                if self.repository.short_code_is_in_use(&identifier, None).await? {
                    return Err(AppError::conflict(
                        format!("Provided slug \"{slug}\" is already in use"),
                        json!({ "custom_slug": slug, "domain": meta.domain }),
                    ));
                }

                slug.to_string()
            }
            None => {
                let length = meta
                    .short_code_length
                    .unwrap_or(self.default_short_code_length);
                self.generate_unique_code(length, meta.domain.clone()).await?
            }
        };

        let domain_id = match meta.domain.as_deref() {
            Some(authority) => Some(self.domain_service.get_or_create(authority).await?.id),
            None => None,
        };

        let created = self
            .repository
            .create(NewShortUrl {
                short_code,
                long_url: meta.long_url,
                domain_id,
                tags: meta.tags,
                title: meta.title,
                valid_since: meta.valid_since,
                valid_until: meta.valid_until,
                max_visits: meta.max_visits,
                crawlable: meta.crawlable,
                author_api_key_id: api_key.map(|k| k.id),
            })
            .await?;

        tracing::info!(short_url = %created.identifier(), "Short URL created");
        Ok(created)
    }

    /// Applies a partial edit to a visible short URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no visible short URL matches.
    /// Returns [`AppError::Validation`] for an invalid long URL or limits.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn update_short_url(
        &self,
        identifier: &ShortUrlIdentifier,
        mut edit: ShortUrlEdit,
        api_key: Option<&ApiKey>,
    ) -> Result<ShortUrl, AppError> {
        let short_url = self.get_short_url(identifier, api_key).await?;

        if let Some(long_url) = edit.long_url.as_deref() {
            edit.long_url = Some(normalize_long_url(long_url)?);
        }
        if let Some(tags) = edit.tags.as_ref() {
            edit.tags = Some(normalize_tags(tags));
        }

        let mut preview = short_url.clone();
        preview.apply(edit.clone());
        validate_limits(preview.max_visits, preview.valid_since, preview.valid_until)?;

        if edit.is_empty() {
            return Ok(short_url);
        }

        self.repository.update(short_url.id, edit).await
    }

    /// Deletes a visible short URL together with its visits.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no visible short URL matches.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn delete_short_url(
        &self,
        identifier: &ShortUrlIdentifier,
        api_key: Option<&ApiKey>,
    ) -> Result<ShortUrl, AppError> {
        let short_url = self.get_short_url(identifier, api_key).await?;

        if !self.repository.delete(short_url.id).await? {
            return Err(short_url_not_found(identifier));
        }

        tracing::info!(short_url = %identifier, "Short URL deleted");
        Ok(short_url)
    }

    /// Tags used by the short URLs visible to `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_tags(&self, api_key: Option<&ApiKey>) -> Result<Vec<String>, AppError> {
        self.repository.list_tags(api_key.map(ApiKey::spec)).await
    }

    /// Body of `robots.txt`: crawlable short codes are allowed, everything
    /// else is disallowed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn robots_txt(&self) -> Result<String, AppError> {
        let codes = self.repository.find_crawlable_short_codes().await?;

        let mut body = String::from("# For more information about the robots.txt standard, see:\n");
        body.push_str("# https://www.robotstxt.org/orig.html\n\nUser-agent: *\n");
        for code in codes {
            body.push_str(&format!("Allow: /{code}\n"));
        }
        body.push_str("Disallow: /\n");

        Ok(body)
    }

    async fn generate_unique_code(
        &self,
        length: usize,
        domain: Option<String>,
    ) -> Result<String, AppError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let identifier = ShortUrlIdentifier::new(generate_short_code(length), domain.clone());

            if !self.repository.short_code_is_in_use(&identifier, None).await? {
                return Ok(identifier.short_code);
            }
        }

        Err(AppError::internal(
            "Failed to generate unique short code",
            json!({ "reason": "Too many collisions", "length": length }),
        ))
    }
}

pub(crate) fn short_url_not_found(identifier: &ShortUrlIdentifier) -> AppError {
    AppError::not_found(
        format!("No URL found with short code \"{}\"", identifier.short_code),
        json!({
            "short_code": identifier.short_code,
            "domain": identifier.domain,
        }),
    )
}

fn normalize_long_url(long_url: &str) -> Result<String, AppError> {
    normalize_url(long_url).map_err(|e| AppError::from_fields([("long_url", e.to_string().as_str())]))
}

fn validate_limits(
    max_visits: Option<i64>,
    valid_since: Option<chrono::DateTime<chrono::Utc>>,
    valid_until: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<(), AppError> {
    if max_visits.is_some_and(|max| max < 1) {
        return Err(AppError::from_fields([(
            "max_visits",
            "Max visits has to be greater than 0",
        )]));
    }

    if let (Some(since), Some(until)) = (valid_since, valid_until)
        && since > until
    {
        return Err(AppError::from_fields([(
            "valid_until",
            "Valid until has to be after valid since",
        )]));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ApiKeyRole, Domain, NotFoundRedirects, sample_short_url};
    use crate::domain::models::VisibilitySpec;
    use crate::domain::repositories::{MockDomainRepository, MockShortUrlRepository};
    use chrono::{Duration, Utc};

    type Service = ShortUrlService<MockShortUrlRepository, MockDomainRepository>;

    fn service(repo: MockShortUrlRepository, domains: MockDomainRepository) -> Service {
        let domain_service = DomainService::new(
            Arc::new(domains),
            "s.test",
            NotFoundRedirects::default(),
        );
        ShortUrlService::new(Arc::new(repo), Arc::new(domain_service), 5)
    }

    fn created(new: NewShortUrl) -> ShortUrl {
        let mut short_url = sample_short_url(10, &new.short_code, &new.long_url);
        short_url.domain_id = new.domain_id;
        short_url.tags = new.tags;
        short_url.author_api_key_id = new.author_api_key_id;
        short_url
    }

    fn meta(long_url: &str) -> ShortUrlMeta {
        ShortUrlMeta {
            long_url: long_url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_generates_code_of_default_length() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_short_code_is_in_use()
            .withf(|id, _| id.short_code.len() == 5 && id.domain.is_none())
            .times(1)
            .returning(|_, _| Ok(false));
        repo.expect_create()
            .withf(|new| new.long_url == "https://example.com/" && new.domain_id.is_none())
            .times(1)
            .returning(|new| Ok(created(new)));

        let result = service(repo, MockDomainRepository::new())
            .create_short_url(meta("https://EXAMPLE.com"), None)
            .await
            .unwrap();

        assert_eq!(result.short_code.len(), 5);
    }

    #[tokio::test]
    async fn test_create_retries_on_collision() {
        let mut repo = MockShortUrlRepository::new();
        let mut calls = 0;
        repo.expect_short_code_is_in_use()
            .times(2)
            .returning(move |_, _| {
                calls += 1;
                Ok(calls == 1)
            });
        repo.expect_create().times(1).returning(|new| Ok(created(new)));

        let result = service(repo, MockDomainRepository::new())
            .create_short_url(meta("https://example.com"), None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_with_custom_slug_conflict() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_short_code_is_in_use()
            .withf(|id, _| id.short_code == "taken")
            .times(1)
            .returning(|_, _| Ok(true));
        repo.expect_create().times(0);

        let mut meta = meta("https://example.com");
        meta.custom_slug = Some("taken".to_string());

        let result = service(repo, MockDomainRepository::new())
            .create_short_url(meta, None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_create_with_invalid_custom_slug() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_short_code_is_in_use().times(0);

        let mut meta = meta("https://example.com");
        meta.custom_slug = Some("foo/bar".to_string());

        let result = service(repo, MockDomainRepository::new())
            .create_short_url(meta, None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_long_url() {
        let result = service(MockShortUrlRepository::new(), MockDomainRepository::new())
            .create_short_url(meta("javascript:alert(1)"), None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_zero_max_visits() {
        let mut meta = meta("https://example.com");
        meta.max_visits = Some(0);

        let result = service(MockShortUrlRepository::new(), MockDomainRepository::new())
            .create_short_url(meta, None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_find_if_exists_returns_existing() {
        let mut repo = MockShortUrlRepository::new();
        let existing = sample_short_url(3, "exist", "https://example.com/");
        repo.expect_find_one_matching()
            .withf(|meta| meta.long_url == "https://example.com/" && meta.tags == ["foo"])
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create().times(0);

        let mut meta = meta("https://example.com");
        meta.find_if_exists = true;
        meta.tags = vec![" FOO ".to_string(), "foo".to_string()];

        let result = service(repo, MockDomainRepository::new())
            .create_short_url(meta, None)
            .await
            .unwrap();

        assert_eq!(result.id, 3);
    }

    #[tokio::test]
    async fn test_create_on_custom_domain_gets_or_creates_it() {
        let mut repo = MockShortUrlRepository::new();
        let mut domains = MockDomainRepository::new();

        repo.expect_short_code_is_in_use()
            .withf(|id, _| id.domain.as_deref() == Some("custom.com"))
            .returning(|_, _| Ok(false));
        domains
            .expect_upsert()
            .withf(|new| new.authority == "custom.com")
            .times(1)
            .returning(|new| Ok(Domain::new(4, new.authority)));
        repo.expect_create()
            .withf(|new| new.domain_id == Some(4))
            .times(1)
            .returning(|new| Ok(created(new)));

        let mut meta = meta("https://example.com");
        meta.domain = Some("Custom.com".to_string());

        let result = service(repo, domains).create_short_url(meta, None).await.unwrap();

        assert_eq!(result.domain_id, Some(4));
    }

    #[tokio::test]
    async fn test_create_on_default_domain_stores_no_domain() {
        let mut repo = MockShortUrlRepository::new();
        let mut domains = MockDomainRepository::new();

        repo.expect_short_code_is_in_use().returning(|_, _| Ok(false));
        domains.expect_upsert().times(0);
        repo.expect_create()
            .withf(|new| new.domain_id.is_none())
            .times(1)
            .returning(|new| Ok(created(new)));

        let mut meta = meta("https://example.com");
        meta.domain = Some("s.test".to_string());

        service(repo, domains).create_short_url(meta, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_with_domain_specific_key_forces_its_domain() {
        let mut repo = MockShortUrlRepository::new();
        let mut domains = MockDomainRepository::new();
        let key = ApiKey::new(
            6,
            "scoped",
            vec![ApiKeyRole::for_domain(&Domain::new(2, "mine.com"))],
        );

        repo.expect_short_code_is_in_use().returning(|_, _| Ok(false));
        domains
            .expect_upsert()
            .withf(|new| new.authority == "mine.com")
            .returning(|new| Ok(Domain::new(2, new.authority)));
        repo.expect_create()
            .withf(|new| new.domain_id == Some(2) && new.author_api_key_id == Some(6))
            .times(1)
            .returning(|new| Ok(created(new)));

        let mut meta = meta("https://example.com");
        meta.domain = Some("other.com".to_string());

        service(repo, domains)
            .create_short_url(meta, Some(&key))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_short_url_not_found() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_one().times(1).returning(|_, _| Ok(None));

        let result = service(repo, MockDomainRepository::new())
            .get_short_url(&ShortUrlIdentifier::new("abc", None), None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_applies_normalized_tags() {
        let mut repo = MockShortUrlRepository::new();
        let key = ApiKey::new(2, "author", vec![ApiKeyRole::AuthoredShortUrls]);

        repo.expect_find_one()
            .withf(|id, spec| {
                id.short_code == "abc"
                    && *spec
                        == Some(VisibilitySpec {
                            author_api_key_id: Some(2),
                            domain_id: None,
                        })
            })
            .times(1)
            .returning(|_, _| Ok(Some(sample_short_url(1, "abc", "https://a.com"))));
        repo.expect_update()
            .withf(|id, edit| *id == 1 && edit.tags == Some(vec!["foo".into(), "bar".into()]))
            .times(1)
            .returning(|_, edit| {
                let mut short_url = sample_short_url(1, "abc", "https://a.com");
                short_url.apply(edit);
                Ok(short_url)
            });

        let result = service(repo, MockDomainRepository::new())
            .update_short_url(
                &ShortUrlIdentifier::new("abc", None),
                ShortUrlEdit::with_tags(vec!["Foo".into(), "bar".into(), "FOO".into()]),
                Some(&key),
            )
            .await
            .unwrap();

        assert_eq!(result.tags, vec!["foo", "bar"]);
    }

    #[tokio::test]
    async fn test_update_rejects_inverted_validity() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_one()
            .returning(|_, _| Ok(Some(sample_short_url(1, "abc", "https://a.com"))));
        repo.expect_update().times(0);

        let now = Utc::now();
        let edit = ShortUrlEdit {
            valid_since: Some(Some(now)),
            valid_until: Some(Some(now - Duration::days(1))),
            ..Default::default()
        };

        let result = service(repo, MockDomainRepository::new())
            .update_short_url(&ShortUrlIdentifier::new("abc", None), edit, None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_delete_short_url() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_one()
            .returning(|_, _| Ok(Some(sample_short_url(1, "abc", "https://a.com"))));
        repo.expect_delete()
            .withf(|id| *id == 1)
            .times(1)
            .returning(|_| Ok(true));

        let deleted = service(repo, MockDomainRepository::new())
            .delete_short_url(&ShortUrlIdentifier::new("abc", None), None)
            .await
            .unwrap();

        assert_eq!(deleted.short_code, "abc");
    }

    #[tokio::test]
    async fn test_robots_txt_lists_crawlable_codes() {
        let mut repo = MockShortUrlRepository::new();
        repo.expect_find_crawlable_short_codes()
            .times(1)
            .returning(|| Ok(vec!["foo".to_string(), "bar".to_string()]));

        let body = service(repo, MockDomainRepository::new())
            .robots_txt()
            .await
            .unwrap();

        assert!(body.contains("User-agent: *\nAllow: /foo\nAllow: /bar\nDisallow: /\n"));
    }

    #[tokio::test]
    async fn test_list_tags_forwards_spec() {
        let mut repo = MockShortUrlRepository::new();
        let key = ApiKey::new(2, "author", vec![ApiKeyRole::AuthoredShortUrls]);
        let expected = Some(key.spec());

        repo.expect_list_tags()
            .withf(move |spec| *spec == expected)
            .times(1)
            .returning(|_| Ok(vec!["foo".to_string()]));

        let tags = service(repo, MockDomainRepository::new())
            .list_tags(Some(&key))
            .await
            .unwrap();

        assert_eq!(tags, vec!["foo"]);
    }
}
