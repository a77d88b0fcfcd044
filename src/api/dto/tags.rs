//! DTOs for tag listings.

use serde::Serialize;

use crate::api::dto::pagination::DataList;

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: DataList<String>,
}
