//! Helpers shared across layers.
//!
//! - [`code_generator`] - Short codes, custom slugs, API keys and secrets
//! - [`url_normalizer`] - Long URL validation
//! - [`tags`] - Tag list normalization
//! - [`extract_domain`] - Request authority extraction

pub mod code_generator;
pub mod extract_domain;
pub mod tags;
pub mod url_normalizer;
