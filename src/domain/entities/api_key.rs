//! API key entity and the roles that bound what a key can see.

use chrono::{DateTime, Utc};

use crate::domain::entities::Domain;
use crate::domain::models::VisibilitySpec;

/// A role attached to an API key. A key without roles is an admin key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyRole {
    /// Only short URLs created with this key are visible.
    AuthoredShortUrls,
    /// Only the given domain (and its short URLs) is visible.
    DomainSpecific { domain_id: i64, authority: String },
}

impl ApiKeyRole {
    pub fn for_domain(domain: &Domain) -> Self {
        Self::DomainSpecific {
            domain_id: domain.id,
            authority: domain.authority.clone(),
        }
    }

    /// Stable name used for storage and display.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthoredShortUrls => "AUTHORED_SHORT_URLS",
            Self::DomainSpecific { .. } => "DOMAIN_SPECIFIC",
        }
    }
}

/// A credential scoping an operator's visible data subset.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKey {
    pub id: i64,
    pub name: String,
    pub key_hash: String,
    pub enabled: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub roles: Vec<ApiKeyRole>,
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    pub fn new(id: i64, name: impl Into<String>, roles: Vec<ApiKeyRole>) -> Self {
        Self {
            id,
            name: name.into(),
            key_hash: String::new(),
            enabled: true,
            expires_at: None,
            roles,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }

    pub fn is_valid(&self) -> bool {
        self.enabled && !self.is_expired()
    }

    /// Domain this key is restricted to, if any.
    pub fn domain_id(&self) -> Option<i64> {
        self.roles.iter().find_map(|role| match role {
            ApiKeyRole::DomainSpecific { domain_id, .. } => Some(*domain_id),
            ApiKeyRole::AuthoredShortUrls => None,
        })
    }

    /// Authority of the domain this key is restricted to, if any.
    pub fn domain_authority(&self) -> Option<&str> {
        self.roles.iter().find_map(|role| match role {
            ApiKeyRole::DomainSpecific { authority, .. } => Some(authority.as_str()),
            ApiKeyRole::AuthoredShortUrls => None,
        })
    }

    pub fn is_domain_specific(&self) -> bool {
        self.domain_id().is_some()
    }

    pub fn only_authored_short_urls(&self) -> bool {
        self.roles.contains(&ApiKeyRole::AuthoredShortUrls)
    }

    /// Visibility predicate derived from the roles of this key.
    pub fn spec(&self) -> VisibilitySpec {
        VisibilitySpec {
            author_api_key_id: self.only_authored_short_urls().then_some(self.id),
            domain_id: self.domain_id(),
        }
    }
}

/// Input data for storing a new API key.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub name: String,
    pub key_hash: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub roles: Vec<ApiKeyRole>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_admin_key_has_empty_spec() {
        let key = ApiKey::new(1, "admin", vec![]);

        assert!(key.is_admin());
        assert!(key.spec().is_unrestricted());
    }

    #[test]
    fn test_domain_specific_key() {
        let domain = Domain::new(123, "foo.com");
        let key = ApiKey::new(2, "scoped", vec![ApiKeyRole::for_domain(&domain)]);

        assert!(!key.is_admin());
        assert!(key.is_domain_specific());
        assert_eq!(key.domain_authority(), Some("foo.com"));
        assert_eq!(key.spec().domain_id, Some(123));
        assert!(key.spec().author_api_key_id.is_none());
    }

    #[test]
    fn test_author_only_key() {
        let key = ApiKey::new(5, "author", vec![ApiKeyRole::AuthoredShortUrls]);

        assert_eq!(key.spec().author_api_key_id, Some(5));
        assert!(key.spec().domain_id.is_none());
    }

    #[test]
    fn test_expired_key_is_invalid() {
        let mut key = ApiKey::new(1, "old", vec![]);
        key.expires_at = Some(Utc::now() - Duration::minutes(1));

        assert!(key.is_expired());
        assert!(!key.is_valid());
    }

    #[test]
    fn test_disabled_key_is_invalid() {
        let mut key = ApiKey::new(1, "off", vec![]);
        key.enabled = false;

        assert!(!key.is_valid());
    }
}
