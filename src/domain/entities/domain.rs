//! Domain entity, its "not found" redirect configuration and listing projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where visitors are sent when nothing matches on a domain.
///
/// - `base_url_redirect` - visits to the domain root (`/`)
/// - `regular_404_redirect` - any other path that is not a short code
/// - `invalid_short_url_redirect` - short codes that don't exist or are disabled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundRedirects {
    pub base_url_redirect: Option<String>,
    pub regular_404_redirect: Option<String>,
    pub invalid_short_url_redirect: Option<String>,
}

impl NotFoundRedirects {
    pub fn new(
        base_url_redirect: Option<String>,
        regular_404_redirect: Option<String>,
        invalid_short_url_redirect: Option<String>,
    ) -> Self {
        Self {
            base_url_redirect,
            regular_404_redirect,
            invalid_short_url_redirect,
        }
    }

    pub fn has_any(&self) -> bool {
        self.base_url_redirect.is_some()
            || self.regular_404_redirect.is_some()
            || self.invalid_short_url_redirect.is_some()
    }
}

/// A custom domain under which short URLs may be served.
///
/// The default domain is never stored: it comes from configuration and short
/// URLs served from it have no domain attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub id: i64,
    pub authority: String,
    pub redirects: NotFoundRedirects,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Domain {
    pub fn new(id: i64, authority: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            authority: authority.into(),
            redirects: NotFoundRedirects::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn base_url_redirect(&self) -> Option<&str> {
        self.redirects.base_url_redirect.as_deref()
    }

    pub fn regular_404_redirect(&self) -> Option<&str> {
        self.redirects.regular_404_redirect.as_deref()
    }

    pub fn invalid_short_url_redirect(&self) -> Option<&str> {
        self.redirects.invalid_short_url_redirect.as_deref()
    }
}

/// Input data for inserting a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDomain {
    pub authority: String,
}

/// Read-only projection of a domain for listings.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainItem {
    /// The configured default domain, carrying the global redirect options.
    Default {
        authority: String,
        redirects: NotFoundRedirects,
    },
    /// A domain stored in the database.
    Existing {
        id: i64,
        authority: String,
        redirects: NotFoundRedirects,
    },
}

impl DomainItem {
    pub fn for_default_domain(authority: impl Into<String>, options: &NotFoundRedirects) -> Self {
        Self::Default {
            authority: authority.into(),
            redirects: options.clone(),
        }
    }

    pub fn for_existing_domain(domain: &Domain) -> Self {
        Self::Existing {
            id: domain.id,
            authority: domain.authority.clone(),
            redirects: domain.redirects.clone(),
        }
    }

    pub fn authority(&self) -> &str {
        match self {
            Self::Default { authority, .. } | Self::Existing { authority, .. } => authority,
        }
    }

    pub fn redirects(&self) -> &NotFoundRedirects {
        match self {
            Self::Default { redirects, .. } | Self::Existing { redirects, .. } => redirects,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default { .. })
    }
}
