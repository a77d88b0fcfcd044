//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Redirect caching (Redis and no-op implementations)
//! - [`memory`] - In-process repository implementations
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod memory;
pub mod persistence;
