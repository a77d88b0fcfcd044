//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`models`] - Value types shared by services and repositories
//! - [`repositories`] - Data access trait definitions
//! - [`visit_event`] - Visit tracking event model
//! - [`visit_worker`] - Asynchronous visit processing worker
//!
//! # Visit Processing Flow
//!
//! 1. Redirect handler resolves a short URL (or fails to)
//! 2. [`visit_event::VisitEvent`] is sent to a bounded channel
//! 3. [`visit_worker::run_visit_worker`] persists it with retry logic
//! 4. The short URL visit counter is incremented for non-orphan visits

pub mod entities;
pub mod models;
pub mod repositories;
pub mod visit_event;
pub mod visit_worker;
