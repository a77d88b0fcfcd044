//! Visit event model for asynchronous visit tracking.

use crate::domain::entities::{NewVisit, VisitType};

/// A visit captured by a redirect handler, waiting to be persisted.
///
/// Handlers push these into a bounded channel with `try_send` so the HTTP
/// response never waits on the database.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitEvent {
    pub short_url_id: Option<i64>,
    pub visit_type: VisitType,
    pub visited_url: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub remote_addr: Option<String>,
}

impl VisitEvent {
    /// A visit to an existing short URL.
    pub fn valid(
        short_url_id: i64,
        remote_addr: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            short_url_id: Some(short_url_id),
            visit_type: VisitType::Valid,
            visited_url: None,
            referer: referer.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            remote_addr,
        }
    }

    /// A visit that did not match any short URL.
    pub fn orphan(
        visit_type: VisitType,
        visited_url: String,
        remote_addr: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            short_url_id: None,
            visit_type,
            visited_url: Some(visited_url),
            referer: referer.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            remote_addr,
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.short_url_id.is_none()
    }
}

impl From<VisitEvent> for NewVisit {
    fn from(event: VisitEvent) -> Self {
        NewVisit {
            short_url_id: event.short_url_id,
            visit_type: event.visit_type,
            visited_url: event.visited_url,
            referer: event.referer,
            user_agent: event.user_agent,
            remote_addr: event.remote_addr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_visit_event() {
        let event = VisitEvent::valid(
            7,
            Some("10.0.0.1".to_string()),
            Some("Mozilla/5.0"),
            Some("https://google.com"),
        );

        assert_eq!(event.short_url_id, Some(7));
        assert_eq!(event.visit_type, VisitType::Valid);
        assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(event.referer.as_deref(), Some("https://google.com"));
        assert!(!event.is_orphan());
    }

    #[test]
    fn test_orphan_visit_event() {
        let event = VisitEvent::orphan(
            VisitType::InvalidShortUrl,
            "https://s.test/nope".to_string(),
            None,
            None,
            None,
        );

        assert!(event.is_orphan());
        assert_eq!(event.visited_url.as_deref(), Some("https://s.test/nope"));
        assert!(event.remote_addr.is_none());
    }

    #[test]
    fn test_into_new_visit() {
        let event = VisitEvent::valid(3, None, Some("curl/8"), None);
        let visit: NewVisit = event.into();

        assert_eq!(visit.short_url_id, Some(3));
        assert_eq!(visit.visit_type, VisitType::Valid);
        assert_eq!(visit.user_agent.as_deref(), Some("curl/8"));
    }
}
