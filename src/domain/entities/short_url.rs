//! Short URL entity and its creation/edit inputs.

use chrono::{DateTime, Utc};

use crate::domain::models::ShortUrlIdentifier;

/// A persisted alias mapping a short code (plus optional domain) to a long URL.
///
/// `domain` is `None` for short URLs served from the default domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortUrl {
    pub id: i64,
    pub short_code: String,
    pub long_url: String,
    pub domain: Option<String>,
    pub domain_id: Option<i64>,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_visits: Option<i64>,
    pub crawlable: bool,
    pub author_api_key_id: Option<i64>,
    pub visits_count: i64,
    pub created_at: DateTime<Utc>,
}

impl ShortUrl {
    /// Identifier `(short_code, domain)` of this short URL.
    pub fn identifier(&self) -> ShortUrlIdentifier {
        ShortUrlIdentifier::new(self.short_code.clone(), self.domain.clone())
    }

    /// Returns true when the short URL can currently be visited.
    ///
    /// A short URL stops redirecting before `valid_since`, after `valid_until`
    /// and once `max_visits` has been reached.
    pub fn is_enabled_at(&self, now: DateTime<Utc>) -> bool {
        if self.valid_since.is_some_and(|since| now < since) {
            return false;
        }
        if self.valid_until.is_some_and(|until| now > until) {
            return false;
        }
        if self.max_visits.is_some_and(|max| self.visits_count >= max) {
            return false;
        }
        true
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled_at(Utc::now())
    }

    /// Applies a partial edit in place.
    pub fn apply(&mut self, edit: ShortUrlEdit) {
        if let Some(long_url) = edit.long_url {
            self.long_url = long_url;
        }
        if let Some(tags) = edit.tags {
            self.tags = tags;
        }
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(valid_since) = edit.valid_since {
            self.valid_since = valid_since;
        }
        if let Some(valid_until) = edit.valid_until {
            self.valid_until = valid_until;
        }
        if let Some(max_visits) = edit.max_visits {
            self.max_visits = max_visits;
        }
        if let Some(crawlable) = edit.crawlable {
            self.crawlable = crawlable;
        }
    }
}

/// Input used by the short URL service to create a short URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortUrlMeta {
    pub long_url: String,
    pub custom_slug: Option<String>,
    /// Authority of the target domain. `None` means the default domain.
    pub domain: Option<String>,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_visits: Option<i64>,
    pub crawlable: bool,
    /// Return an equivalent existing short URL instead of creating a new one.
    pub find_if_exists: bool,
    pub short_code_length: Option<usize>,
}

/// Row-level data inserted by [`crate::domain::repositories::ShortUrlRepository::create`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortUrl {
    pub short_code: String,
    pub long_url: String,
    pub domain_id: Option<i64>,
    pub tags: Vec<String>,
    pub title: Option<String>,
    pub valid_since: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_visits: Option<i64>,
    pub crawlable: bool,
    pub author_api_key_id: Option<i64>,
}

/// Partial update of a short URL.
///
/// `None` leaves a field unchanged. For nullable fields `Some(None)` clears the
/// value and `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortUrlEdit {
    pub long_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub title: Option<Option<String>>,
    pub valid_since: Option<Option<DateTime<Utc>>>,
    pub valid_until: Option<Option<DateTime<Utc>>>,
    pub max_visits: Option<Option<i64>>,
    pub crawlable: Option<bool>,
}

impl ShortUrlEdit {
    /// Edit touching only the tag list.
    pub fn with_tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
pub(crate) fn sample_short_url(id: i64, code: &str, long_url: &str) -> ShortUrl {
    ShortUrl {
        id,
        short_code: code.to_string(),
        long_url: long_url.to_string(),
        domain: None,
        domain_id: None,
        tags: vec![],
        title: None,
        valid_since: None,
        valid_until: None,
        max_visits: None,
        crawlable: false,
        author_api_key_id: None,
        visits_count: 0,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_short_url_enabled_by_default() {
        let short_url = sample_short_url(1, "abc123", "https://example.com");
        assert!(short_url.is_enabled());
    }

    #[test]
    fn test_short_url_not_yet_valid() {
        let mut short_url = sample_short_url(1, "abc123", "https://example.com");
        short_url.valid_since = Some(Utc::now() + Duration::hours(1));
        assert!(!short_url.is_enabled());
    }

    #[test]
    fn test_short_url_expired() {
        let mut short_url = sample_short_url(1, "abc123", "https://example.com");
        short_url.valid_until = Some(Utc::now() - Duration::seconds(1));
        assert!(!short_url.is_enabled());
    }

    #[test]
    fn test_short_url_max_visits_reached() {
        let mut short_url = sample_short_url(1, "abc123", "https://example.com");
        short_url.max_visits = Some(3);
        short_url.visits_count = 2;
        assert!(short_url.is_enabled());

        short_url.visits_count = 3;
        assert!(!short_url.is_enabled());
    }

    #[test]
    fn test_apply_edit_only_touches_provided_fields() {
        let mut short_url = sample_short_url(1, "abc123", "https://example.com");
        short_url.title = Some("Old".to_string());

        short_url.apply(ShortUrlEdit::with_tags(vec!["foo".to_string()]));

        assert_eq!(short_url.tags, vec!["foo"]);
        assert_eq!(short_url.title.as_deref(), Some("Old"));
        assert_eq!(short_url.long_url, "https://example.com");
    }

    #[test]
    fn test_apply_edit_clears_nullable_field() {
        let mut short_url = sample_short_url(1, "abc123", "https://example.com");
        short_url.max_visits = Some(10);

        short_url.apply(ShortUrlEdit {
            max_visits: Some(None),
            ..Default::default()
        });

        assert!(short_url.max_visits.is_none());
    }

    #[test]
    fn test_edit_is_empty() {
        assert!(ShortUrlEdit::default().is_empty());
        assert!(!ShortUrlEdit::with_tags(vec![]).is_empty());
    }
}
