//! Visibility predicate derived from an API key.

use crate::domain::entities::ShortUrl;

/// Restricts which short URLs and domains a caller can see.
///
/// Each `Some` field narrows the visible set; an all-`None` spec sees
/// everything. Repositories translate it into query conditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilitySpec {
    /// Only short URLs authored by this API key.
    pub author_api_key_id: Option<i64>,
    /// Only short URLs on, and the domain with, this id.
    pub domain_id: Option<i64>,
}

impl VisibilitySpec {
    pub fn is_unrestricted(&self) -> bool {
        self.author_api_key_id.is_none() && self.domain_id.is_none()
    }

    pub fn matches(&self, short_url: &ShortUrl) -> bool {
        let author_ok = self
            .author_api_key_id
            .is_none_or(|id| short_url.author_api_key_id == Some(id));

        author_ok && self.matches_domain(short_url.domain_id)
    }

    pub fn matches_domain(&self, domain_id: Option<i64>) -> bool {
        self.domain_id.is_none_or(|id| domain_id == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::sample_short_url;

    #[test]
    fn test_unrestricted_matches_anything() {
        let spec = VisibilitySpec::default();
        assert!(spec.is_unrestricted());
        assert!(spec.matches(&sample_short_url(1, "abc", "https://a.com")));
    }

    #[test]
    fn test_author_restriction() {
        let spec = VisibilitySpec {
            author_api_key_id: Some(3),
            domain_id: None,
        };

        let mut mine = sample_short_url(1, "abc", "https://a.com");
        mine.author_api_key_id = Some(3);
        let theirs = sample_short_url(2, "def", "https://b.com");

        assert!(spec.matches(&mine));
        assert!(!spec.matches(&theirs));
    }

    #[test]
    fn test_domain_restriction_excludes_default_domain() {
        let spec = VisibilitySpec {
            author_api_key_id: None,
            domain_id: Some(9),
        };

        let mut on_domain = sample_short_url(1, "abc", "https://a.com");
        on_domain.domain_id = Some(9);
        let on_default = sample_short_url(2, "def", "https://b.com");

        assert!(spec.matches(&on_domain));
        assert!(!spec.matches(&on_default));
    }
}
