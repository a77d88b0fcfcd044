mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use urlkeeper::domain::entities::{NewVisit, VisitType};
use urlkeeper::domain::models::DateRange;
use urlkeeper::domain::repositories::VisitRepository;
use urlkeeper::infrastructure::persistence::PgVisitRepository;

fn visit(short_url_id: Option<i64>, visit_type: VisitType) -> NewVisit {
    NewVisit {
        short_url_id,
        visit_type,
        visited_url: None,
        referer: Some("https://referer.com".to_string()),
        user_agent: Some("test-agent".to_string()),
        remote_addr: Some("192.168.1.10".to_string()),
    }
}

#[sqlx::test]
async fn test_record_visit(pool: PgPool) {
    let short_url_id =
        common::create_test_short_url(&pool, "abc", "https://example.com", None).await;
    let repo = PgVisitRepository::new(Arc::new(pool));

    let recorded = repo
        .record(visit(Some(short_url_id), VisitType::Valid))
        .await
        .unwrap();

    assert_eq!(recorded.short_url_id, Some(short_url_id));
    assert_eq!(recorded.visit_type, VisitType::Valid);
    assert_eq!(recorded.remote_addr.as_deref(), Some("192.168.1.10"));
    assert_eq!(recorded.referer.as_deref(), Some("https://referer.com"));
}

#[sqlx::test]
async fn test_record_drops_unparsable_remote_addr(pool: PgPool) {
    let repo = PgVisitRepository::new(Arc::new(pool));

    let recorded = repo
        .record(NewVisit {
            remote_addr: Some("not-an-ip".to_string()),
            ..visit(None, VisitType::Regular404)
        })
        .await
        .unwrap();

    assert!(recorded.remote_addr.is_none());
}

#[sqlx::test]
async fn test_find_by_short_url_pages_newest_first(pool: PgPool) {
    let short_url_id =
        common::create_test_short_url(&pool, "abc", "https://example.com", None).await;
    let other_id = common::create_test_short_url(&pool, "def", "https://example.com", None).await;
    let repo = PgVisitRepository::new(Arc::new(pool));

    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(repo.record(visit(Some(short_url_id), VisitType::Valid)).await.unwrap().id);
    }
    repo.record(visit(Some(other_id), VisitType::Valid)).await.unwrap();

    let all = repo
        .find_by_short_url(short_url_id, None, None, None)
        .await
        .unwrap();
    let found: Vec<_> = all.iter().map(|v| v.id).collect();
    ids.reverse();
    assert_eq!(found, ids);

    let page = repo
        .find_by_short_url(short_url_id, None, Some(1), Some(1))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, ids[1]);

    assert_eq!(repo.count_by_short_url(short_url_id, None).await.unwrap(), 3);

    let future = DateRange::since(Utc::now() + Duration::hours(1));
    assert_eq!(
        repo.count_by_short_url(short_url_id, Some(future)).await.unwrap(),
        0
    );
}

#[sqlx::test]
async fn test_orphan_visits(pool: PgPool) {
    let short_url_id =
        common::create_test_short_url(&pool, "abc", "https://example.com", None).await;
    let repo = PgVisitRepository::new(Arc::new(pool));

    repo.record(visit(Some(short_url_id), VisitType::Valid)).await.unwrap();
    repo.record(visit(None, VisitType::BaseUrl)).await.unwrap();
    repo.record(visit(None, VisitType::InvalidShortUrl)).await.unwrap();

    let orphans = repo.find_orphans(None, None, None).await.unwrap();
    assert_eq!(orphans.len(), 2);
    assert!(orphans.iter().all(|v| v.visit_type.is_orphan()));
    assert_eq!(orphans[0].visit_type, VisitType::InvalidShortUrl);

    assert_eq!(repo.count_orphans(None).await.unwrap(), 2);
    let past = DateRange::until(Utc::now() - Duration::hours(1));
    assert_eq!(repo.count_orphans(Some(past)).await.unwrap(), 0);
}

#[sqlx::test]
async fn test_visits_are_deleted_with_their_short_url(pool: PgPool) {
    let short_url_id =
        common::create_test_short_url(&pool, "abc", "https://example.com", None).await;
    let repo = PgVisitRepository::new(Arc::new(pool.clone()));

    repo.record(visit(Some(short_url_id), VisitType::Valid)).await.unwrap();

    sqlx::query("DELETE FROM short_urls WHERE id = $1")
        .bind(short_url_id)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(repo.count_by_short_url(short_url_id, None).await.unwrap(), 0);
}
