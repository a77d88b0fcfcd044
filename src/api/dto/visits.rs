//! DTOs for visit listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::dto::pagination::{DateFilterParams, PageParams, PaginatedData};
use crate::domain::entities::{Visit, VisitType};

/// Query parameters of visit listings.
#[derive(Debug, Default, Deserialize)]
pub struct VisitsQuery {
    #[serde(flatten)]
    pub pagination: PageParams,

    #[serde(flatten)]
    pub date_filter: DateFilterParams,

    /// Domain of the short URL. Ignored by orphan visit listings.
    pub domain: Option<String>,
}

/// JSON representation of a visit.
///
/// The remote address is stored but never exposed through the API.
#[derive(Debug, Serialize)]
pub struct VisitResponse {
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub visit_type: VisitType,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visited_url: Option<String>,
}

impl From<Visit> for VisitResponse {
    fn from(visit: Visit) -> Self {
        Self {
            date: visit.visited_at,
            visit_type: visit.visit_type,
            referer: visit.referer,
            user_agent: visit.user_agent,
            visited_url: visit.visited_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VisitsResponse {
    pub visits: PaginatedData<VisitResponse>,
}
