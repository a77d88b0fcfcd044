//! Data Transfer Objects for the REST API.
//!
//! Request bodies and query strings deserialize into these types; responses
//! are built from domain entities through `From` conversions.

pub mod domains;
pub mod health;
pub mod pagination;
pub mod short_url;
pub mod tags;
pub mod visits;
