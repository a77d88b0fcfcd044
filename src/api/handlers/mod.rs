//! HTTP request handlers.
//!
//! Handlers under `/api` receive the authenticated
//! [`crate::domain::entities::ApiKey`] through `Extension` and pass it to
//! the services, which apply its visibility rules.

pub mod domains;
pub mod health;
pub mod redirect;
pub mod robots;
pub mod short_urls;
pub mod tags;
pub mod visits;

pub use domains::{domain_redirects_handler, list_domains_handler};
pub use health::health_handler;
pub use redirect::{base_url_handler, redirect_handler, regular_404_handler};
pub use robots::robots_handler;
pub use short_urls::{
    create_short_url_handler, delete_short_url_handler, edit_short_url_handler,
    edit_short_url_tags_handler, get_short_url_handler, list_short_urls_handler,
};
pub use tags::list_tags_handler;
pub use visits::{orphan_visits_handler, short_url_visits_handler};
