//! Background worker persisting visit events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::entities::NewVisit;
use crate::domain::repositories::{ShortUrlRepository, VisitRepository};
use crate::domain::visit_event::VisitEvent;

const MAX_RETRIES: usize = 3;

fn retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES)
}

/// Consumes visit events until every sender is dropped.
///
/// Each event is recorded with exponential backoff; a visit to an existing
/// short URL also bumps its counter. Events that still fail after all retries
/// are logged and dropped.
pub async fn run_visit_worker<V, S>(
    mut rx: mpsc::Receiver<VisitEvent>,
    visit_repository: Arc<V>,
    short_url_repository: Arc<S>,
) where
    V: VisitRepository + ?Sized,
    S: ShortUrlRepository + ?Sized,
{
    while let Some(event) = rx.recv().await {
        let short_url_id = event.short_url_id;
        let new_visit: NewVisit = event.into();

        let recorded = Retry::start(retry_strategy(), || {
            let repository = visit_repository.clone();
            let visit = new_visit.clone();
            async move { repository.record(visit).await }
        })
        .await;

        if let Err(e) = recorded {
            tracing::error!(error = %e, "Failed to record visit after retries");
            metrics::counter!("urlkeeper_visits_failed_total").increment(1);
            continue;
        }

        metrics::counter!("urlkeeper_visits_recorded_total").increment(1);

        if let Some(id) = short_url_id
            && let Err(e) = short_url_repository.increment_visits(id).await
        {
            tracing::warn!(error = %e, short_url_id = id, "Failed to increment visits count");
        }
    }

    tracing::info!("Visit worker stopped");
}
