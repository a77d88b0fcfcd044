//! In-memory implementation of short URL repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{NewShortUrl, ShortUrl, ShortUrlEdit, ShortUrlMeta};
use crate::domain::models::{
    DateRange, OrderDirection, OrderField, ShortUrlIdentifier, ShortUrlsOrdering, VisibilitySpec,
};
use crate::domain::repositories::{DomainRepository, ShortUrlRepository};
use crate::error::AppError;

use super::InMemoryDomainRepository;

/// Short URLs kept in a vector behind a lock.
///
/// Applies the same filtering rules as the PostgreSQL repository. Domain
/// authorities are resolved through the shared [`InMemoryDomainRepository`].
pub struct InMemoryShortUrlRepository {
    short_urls: RwLock<Vec<ShortUrl>>,
    domains: Arc<InMemoryDomainRepository>,
}

impl InMemoryShortUrlRepository {
    pub fn new(domains: Arc<InMemoryDomainRepository>) -> Self {
        Self {
            short_urls: RwLock::new(Vec::new()),
            domains,
        }
    }
}

fn matches_identifier(short_url: &ShortUrl, identifier: &ShortUrlIdentifier) -> bool {
    short_url.short_code == identifier.short_code && short_url.domain == identifier.domain
}

fn matches_filters(
    short_url: &ShortUrl,
    search_term: Option<&str>,
    tags: &[String],
    date_range: Option<DateRange>,
    spec: Option<VisibilitySpec>,
) -> bool {
    if let Some(term) = search_term.map(str::trim).filter(|t| !t.is_empty()) {
        let term = term.to_lowercase();
        let hit = [
            Some(short_url.long_url.as_str()),
            Some(short_url.short_code.as_str()),
            short_url.title.as_deref(),
            short_url.domain.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term));

        if !hit {
            return false;
        }
    }

    if !tags.is_empty() && !short_url.tags.iter().any(|t| tags.contains(t)) {
        return false;
    }

    if date_range.is_some_and(|r| !r.contains(short_url.created_at)) {
        return false;
    }

    spec.is_none_or(|s| s.matches(short_url))
}

fn compare(a: &ShortUrl, b: &ShortUrl, ordering: ShortUrlsOrdering) -> Ordering {
    let by_field = match ordering.field {
        OrderField::LongUrl => a.long_url.cmp(&b.long_url),
        OrderField::ShortCode => a.short_code.cmp(&b.short_code),
        OrderField::DateCreated => a.created_at.cmp(&b.created_at),
        OrderField::Visits => a.visits_count.cmp(&b.visits_count),
        OrderField::Title => match (&a.title, &b.title) {
            // Untitled short URLs go last in both directions, like `NULLS LAST`.
            (None, None) => Ordering::Equal,
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            (Some(a_title), Some(b_title)) => a_title.cmp(b_title),
        },
    };

    let by_field = match ordering.direction {
        OrderDirection::Asc => by_field,
        OrderDirection::Desc => by_field.reverse(),
    };

    by_field.then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl ShortUrlRepository for InMemoryShortUrlRepository {
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
        let short_urls = self.short_urls.read().await;

        let mut found: Vec<ShortUrl> = short_urls
            .iter()
            .filter(|s| matches_filters(s, search_term.as_deref(), &tags, date_range, spec))
            .cloned()
            .collect();

        let ordering = order_by.unwrap_or_default();
        found.sort_by(|a, b| compare(a, b, ordering));

        let offset = usize::try_from(offset.unwrap_or(0)).unwrap_or(0);
        let limit = limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);

        Ok(found.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_list(
        &self,
        search_term: Option<String>,
        tags: Vec<String>,
        date_range: Option<DateRange>,
        spec: Option<VisibilitySpec>,
    ) -> Result<i64, AppError> {
        let short_urls = self.short_urls.read().await;

        let count = short_urls
            .iter()
            .filter(|s| matches_filters(s, search_term.as_deref(), &tags, date_range, spec))
            .count();

        Ok(count as i64)
    }

    async fn find_one_with_domain_fallback(
        &self,
        short_code: &str,
        domain: Option<String>,
    ) -> Result<Option<ShortUrl>, AppError> {
        let short_urls = self.short_urls.read().await;

        let on_domain = domain.as_ref().and_then(|authority| {
            short_urls
                .iter()
                .find(|s| s.short_code == short_code && s.domain.as_ref() == Some(authority))
        });
        let on_default = || {
            short_urls
                .iter()
                .find(|s| s.short_code == short_code && s.domain.is_none())
        };

        Ok(on_domain.or_else(on_default).cloned())
    }

    async fn find_one(
        &self,
        identifier: &ShortUrlIdentifier,
        spec: Option<VisibilitySpec>,
    ) -> Result<Option<ShortUrl>, AppError> {
        let short_urls = self.short_urls.read().await;

        Ok(short_urls
            .iter()
            .find(|s| matches_identifier(s, identifier) && spec.is_none_or(|sp| sp.matches(s)))
            .cloned())
    }

    async fn short_code_is_in_use(
        &self,
        identifier: &ShortUrlIdentifier,
        spec: Option<VisibilitySpec>,
    ) -> Result<bool, AppError> {
        Ok(self.find_one(identifier, spec).await?.is_some())
    }

    async fn find_one_matching(&self, meta: &ShortUrlMeta) -> Result<Option<ShortUrl>, AppError> {
        let short_urls = self.short_urls.read().await;

        let same_tags = |tags: &[String]| {
            tags.len() == meta.tags.len() && meta.tags.iter().all(|t| tags.contains(t))
        };

        Ok(short_urls
            .iter()
            .rev()
            .find(|s| {
                s.long_url == meta.long_url
                    && s.domain == meta.domain
                    && same_tags(&s.tags)
                    && meta
                        .custom_slug
                        .as_ref()
                        .is_none_or(|slug| &s.short_code == slug)
            })
            .cloned())
    }

    async fn find_crawlable_short_codes(&self) -> Result<Vec<String>, AppError> {
        let short_urls = self.short_urls.read().await;

        let mut codes: Vec<String> = short_urls
            .iter()
            .filter(|s| s.crawlable)
            .map(|s| s.short_code.clone())
            .collect();
        codes.sort();

        Ok(codes)
    }

    async fn create(&self, new_short_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let domain = match new_short_url.domain_id {
            Some(id) => Some(
                self.domains
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Domain not found", json!({ "id": id })))?
                    .authority,
            ),
            None => None,
        };

        let mut short_urls = self.short_urls.write().await;

        let identifier = ShortUrlIdentifier::new(new_short_url.short_code.clone(), domain.clone());
        if short_urls.iter().any(|s| matches_identifier(s, &identifier)) {
            return Err(AppError::conflict(
                format!(
                    "Provided slug \"{}\" is already in use",
                    new_short_url.short_code
                ),
                json!({ "custom_slug": new_short_url.short_code }),
            ));
        }

        let short_url = ShortUrl {
            id: short_urls.iter().map(|s| s.id).max().unwrap_or(0) + 1,
            short_code: new_short_url.short_code,
            long_url: new_short_url.long_url,
            domain,
            domain_id: new_short_url.domain_id,
            tags: new_short_url.tags,
            title: new_short_url.title,
            valid_since: new_short_url.valid_since,
            valid_until: new_short_url.valid_until,
            max_visits: new_short_url.max_visits,
            crawlable: new_short_url.crawlable,
            author_api_key_id: new_short_url.author_api_key_id,
            visits_count: 0,
            created_at: Utc::now(),
        };
        short_urls.push(short_url.clone());

        Ok(short_url)
    }

    async fn update(&self, id: i64, edit: ShortUrlEdit) -> Result<ShortUrl, AppError> {
        let mut short_urls = self.short_urls.write().await;

        let short_url = short_urls
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::not_found("Short URL not found", json!({ "id": id })))?;
        short_url.apply(edit);

        Ok(short_url.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut short_urls = self.short_urls.write().await;

        let before = short_urls.len();
        short_urls.retain(|s| s.id != id);

        Ok(short_urls.len() < before)
    }

    async fn increment_visits(&self, id: i64) -> Result<(), AppError> {
        let mut short_urls = self.short_urls.write().await;

        if let Some(short_url) = short_urls.iter_mut().find(|s| s.id == id) {
            short_url.visits_count += 1;
        }

        Ok(())
    }

    async fn list_tags(&self, spec: Option<VisibilitySpec>) -> Result<Vec<String>, AppError> {
        let short_urls = self.short_urls.read().await;

        let mut tags: Vec<String> = short_urls
            .iter()
            .filter(|s| spec.is_none_or(|sp| sp.matches(s)))
            .flat_map(|s| s.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();

        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewDomain;

    fn new_short_url(code: &str, long_url: &str) -> NewShortUrl {
        NewShortUrl {
            short_code: code.to_string(),
            long_url: long_url.to_string(),
            domain_id: None,
            tags: vec![],
            title: None,
            valid_since: None,
            valid_until: None,
            max_visits: None,
            crawlable: false,
            author_api_key_id: None,
        }
    }

    async fn repo_with_domain() -> (InMemoryShortUrlRepository, i64) {
        let domains = Arc::new(InMemoryDomainRepository::new());
        let domain = domains
            .upsert(NewDomain {
                authority: "custom.com".to_string(),
            })
            .await
            .unwrap();

        (InMemoryShortUrlRepository::new(domains), domain.id)
    }

    #[tokio::test]
    async fn test_same_code_allowed_on_different_domains() {
        let (repo, domain_id) = repo_with_domain().await;

        repo.create(new_short_url("abc", "https://a.com"))
            .await
            .unwrap();
        let on_domain = repo
            .create(NewShortUrl {
                domain_id: Some(domain_id),
                ..new_short_url("abc", "https://b.com")
            })
            .await
            .unwrap();
        assert_eq!(on_domain.domain.as_deref(), Some("custom.com"));

        let result = repo.create(new_short_url("abc", "https://c.com")).await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_find_one_with_domain_fallback() {
        let (repo, domain_id) = repo_with_domain().await;

        repo.create(new_short_url("abc", "https://default.com"))
            .await
            .unwrap();
        repo.create(NewShortUrl {
            domain_id: Some(domain_id),
            ..new_short_url("def", "https://custom.com")
        })
        .await
        .unwrap();

        let fallback = repo
            .find_one_with_domain_fallback("abc", Some("custom.com".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fallback.long_url, "https://default.com");

        let on_domain = repo
            .find_one_with_domain_fallback("def", Some("custom.com".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(on_domain.long_url, "https://custom.com");

        assert!(
            repo.find_one_with_domain_fallback("def", None)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_find_list_filters_orders_and_pages() {
        let (repo, _) = repo_with_domain().await;

        repo.create(NewShortUrl {
            tags: vec!["foo".to_string()],
            title: Some("Rust book".to_string()),
            ..new_short_url("aaa", "https://rust-lang.org")
        })
        .await
        .unwrap();
        repo.create(NewShortUrl {
            tags: vec!["bar".to_string()],
            ..new_short_url("bbb", "https://example.com")
        })
        .await
        .unwrap();
        repo.create(NewShortUrl {
            tags: vec!["foo".to_string(), "bar".to_string()],
            ..new_short_url("ccc", "https://docs.rs")
        })
        .await
        .unwrap();

        let by_tag = repo
            .find_list(None, None, None, vec!["foo".to_string()], None, None, None)
            .await
            .unwrap();
        assert_eq!(by_tag.len(), 2);

        let by_title = repo
            .find_list(None, None, Some("BOOK".to_string()), vec![], None, None, None)
            .await
            .unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].short_code, "aaa");

        let ordered = repo
            .find_list(
                Some(2),
                Some(1),
                None,
                vec![],
                Some("short_code-ASC".parse().unwrap()),
                None,
                None,
            )
            .await
            .unwrap();
        let codes: Vec<_> = ordered.iter().map(|s| s.short_code.as_str()).collect();
        assert_eq!(codes, vec!["bbb", "ccc"]);

        assert_eq!(repo.count_list(None, vec![], None, None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_order_by_title_puts_untitled_last() {
        let (repo, _) = repo_with_domain().await;

        repo.create(new_short_url("untitled", "https://example.com"))
            .await
            .unwrap();
        repo.create(NewShortUrl {
            title: Some("Alpha".to_string()),
            ..new_short_url("alpha", "https://alpha.com")
        })
        .await
        .unwrap();
        repo.create(NewShortUrl {
            title: Some("Beta".to_string()),
            ..new_short_url("beta", "https://beta.com")
        })
        .await
        .unwrap();

        for (order_by, expected) in [
            ("title-ASC", ["alpha", "beta", "untitled"]),
            ("title-DESC", ["beta", "alpha", "untitled"]),
        ] {
            let found = repo
                .find_list(
                    None,
                    None,
                    None,
                    vec![],
                    Some(order_by.parse().unwrap()),
                    None,
                    None,
                )
                .await
                .unwrap();
            let codes: Vec<_> = found.iter().map(|s| s.short_code.as_str()).collect();
            assert_eq!(codes, expected, "{order_by}");
        }
    }

    #[tokio::test]
    async fn test_spec_restricts_visibility() {
        let (repo, _) = repo_with_domain().await;

        repo.create(NewShortUrl {
            author_api_key_id: Some(7),
            tags: vec!["mine".to_string()],
            ..new_short_url("aaa", "https://a.com")
        })
        .await
        .unwrap();
        repo.create(NewShortUrl {
            tags: vec!["theirs".to_string()],
            ..new_short_url("bbb", "https://b.com")
        })
        .await
        .unwrap();

        let spec = Some(VisibilitySpec {
            author_api_key_id: Some(7),
            domain_id: None,
        });

        assert_eq!(repo.count_list(None, vec![], None, spec).await.unwrap(), 1);
        assert_eq!(repo.list_tags(spec).await.unwrap(), vec!["mine"]);
        assert!(
            repo.find_one(&ShortUrlIdentifier::new("bbb", None), spec)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_update_increment_and_delete() {
        let (repo, _) = repo_with_domain().await;
        let created = repo
            .create(new_short_url("abc", "https://a.com"))
            .await
            .unwrap();

        let updated = repo
            .update(created.id, ShortUrlEdit::with_tags(vec!["x".to_string()]))
            .await
            .unwrap();
        assert_eq!(updated.tags, vec!["x"]);

        repo.increment_visits(created.id).await.unwrap();
        let found = repo
            .find_one(&created.identifier(), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.visits_count, 1);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(matches!(
            repo.update(created.id, ShortUrlEdit::default())
                .await
                .unwrap_err(),
            AppError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_find_one_matching_requires_same_tag_set() {
        let (repo, _) = repo_with_domain().await;
        repo.create(NewShortUrl {
            tags: vec!["a".to_string(), "b".to_string()],
            ..new_short_url("abc", "https://a.com")
        })
        .await
        .unwrap();

        let meta = |tags: Vec<&str>| ShortUrlMeta {
            long_url: "https://a.com".to_string(),
            tags: tags.into_iter().map(String::from).collect(),
            ..Default::default()
        };

        assert!(
            repo.find_one_matching(&meta(vec!["b", "a"]))
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            repo.find_one_matching(&meta(vec!["a"]))
                .await
                .unwrap()
                .is_none()
        );
    }
}
