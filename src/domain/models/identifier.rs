//! Identifier of a short URL: short code plus optional domain.

use std::fmt;

/// `(short_code, domain)` pair uniquely identifying a short URL.
///
/// `domain: None` refers to the default domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortUrlIdentifier {
    pub short_code: String,
    pub domain: Option<String>,
}

impl ShortUrlIdentifier {
    pub fn new(short_code: impl Into<String>, domain: Option<String>) -> Self {
        Self {
            short_code: short_code.into(),
            domain,
        }
    }

    /// Builds an identifier from an API request.
    ///
    /// Blank domains and the default domain itself both resolve to `None`.
    pub fn from_api_request(
        short_code: impl Into<String>,
        domain: Option<&str>,
        default_domain: &str,
    ) -> Self {
        let domain = domain
            .map(str::trim)
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case(default_domain))
            .map(str::to_ascii_lowercase);

        Self::new(short_code, domain)
    }

    /// Cache key used by the redirect cache.
    pub fn cache_key(&self, default_domain: &str) -> String {
        format!(
            "{}:{}",
            self.domain.as_deref().unwrap_or(default_domain),
            self.short_code
        )
    }
}

impl fmt::Display for ShortUrlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{}/{}", domain, self.short_code),
            None => f.write_str(&self.short_code),
        }
    }
}
