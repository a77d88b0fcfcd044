//! Value types shared by repositories and services.

pub mod date_range;
pub mod identifier;
pub mod ordering;
pub mod params;
pub mod visibility;

pub use date_range::DateRange;
pub use identifier::ShortUrlIdentifier;
pub use ordering::{OrderDirection, OrderField, ShortUrlsOrdering};
pub use params::{DEFAULT_ITEMS_PER_PAGE, ShortUrlsParams};
pub use visibility::VisibilitySpec;
