//! Application layer: services and pagination.
//!
//! Services orchestrate repository calls, validation and visibility rules,
//! and give HTTP handlers and the admin CLI a single entry point.
//!
//! # Available Services
//!
//! - [`services::ShortUrlService`] - Short URL creation, listing and edition
//! - [`services::DomainService`] - Custom domains and their redirects
//! - [`services::ApiKeyService`] - API key issuance and authentication
//! - [`services::VisitService`] - Visit listings
//! - [`services::RedirectService`] - Public redirect resolution
//! - [`paginator`] - Offset pagination over repositories

pub mod paginator;
pub mod services;
