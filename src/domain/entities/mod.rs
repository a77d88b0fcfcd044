//! Core domain entities.
//!
//! - [`ShortUrl`] - an alias mapping a short code to a long URL
//! - [`Domain`] - a custom domain and its "not found" redirects
//! - [`DomainItem`] - listing projection distinguishing the default domain
//! - [`ApiKey`] - a credential whose roles bound what the caller can see
//! - [`Visit`] - a recorded redirect attempt
//!
//! Creation inputs live next to their entity (`NewShortUrl`, `NewDomain`,
//! `NewApiKey`, `NewVisit`).

pub mod api_key;
pub mod domain;
pub mod short_url;
pub mod visit;

pub use api_key::{ApiKey, ApiKeyRole, NewApiKey};
pub use domain::{Domain, DomainItem, NewDomain, NotFoundRedirects};
pub use short_url::{NewShortUrl, ShortUrl, ShortUrlEdit, ShortUrlMeta};
pub use visit::{NewVisit, Visit, VisitType};

#[cfg(test)]
pub(crate) use short_url::sample_short_url;
