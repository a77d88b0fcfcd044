//! Visit entity recorded on every redirect attempt.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Kind of visit. Everything but `Valid` is an orphan visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    Valid,
    BaseUrl,
    Regular404,
    InvalidShortUrl,
}

impl VisitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::BaseUrl => "base_url",
            Self::Regular404 => "regular_404",
            Self::InvalidShortUrl => "invalid_short_url",
        }
    }

    pub fn is_orphan(&self) -> bool {
        !matches!(self, Self::Valid)
    }
}

impl fmt::Display for VisitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valid" => Ok(Self::Valid),
            "base_url" => Ok(Self::BaseUrl),
            "regular_404" => Ok(Self::Regular404),
            "invalid_short_url" => Ok(Self::InvalidShortUrl),
            other => Err(format!("unknown visit type: {other}")),
        }
    }
}

/// A stored visit.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub id: i64,
    pub short_url_id: Option<i64>,
    pub visit_type: VisitType,
    pub visited_url: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub remote_addr: Option<String>,
    pub visited_at: DateTime<Utc>,
}

/// Input data for recording a visit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisit {
    pub short_url_id: Option<i64>,
    pub visit_type: VisitType,
    pub visited_url: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub remote_addr: Option<String>,
}
