mod common;

use sqlx::PgPool;
use std::sync::Arc;
use urlkeeper::AppError;
use urlkeeper::domain::entities::{NewDomain, NotFoundRedirects};
use urlkeeper::domain::models::VisibilitySpec;
use urlkeeper::domain::repositories::DomainRepository;
use urlkeeper::infrastructure::persistence::PgDomainRepository;

fn new_domain(authority: &str) -> NewDomain {
    NewDomain {
        authority: authority.to_string(),
    }
}

#[sqlx::test]
async fn test_upsert_domain(pool: PgPool) {
    let repo = PgDomainRepository::new(Arc::new(pool));

    let created = repo.upsert(new_domain("new-test.com")).await.unwrap();

    assert_eq!(created.authority, "new-test.com");
    assert!(!created.redirects.has_any());
}

#[sqlx::test]
async fn test_upsert_existing_domain_returns_stored_row(pool: PgPool) {
    let repo = PgDomainRepository::new(Arc::new(pool));

    let created = repo.upsert(new_domain("again.com")).await.unwrap();
    let redirects = NotFoundRedirects::new(Some("https://base".to_string()), None, None);
    repo.save_redirects(created.id, redirects.clone()).await.unwrap();

    let again = repo.upsert(new_domain("again.com")).await.unwrap();

    assert_eq!(again.id, created.id);
    assert_eq!(again.redirects, redirects);
}

#[sqlx::test]
async fn test_concurrent_upserts_share_one_domain(pool: PgPool) {
    let repo = Arc::new(PgDomainRepository::new(Arc::new(pool)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.upsert(new_domain("race.com")).await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.dedup();

    assert_eq!(ids.len(), 1);
}

#[sqlx::test]
async fn test_find_by_authority_and_id(pool: PgPool) {
    let id = common::create_test_domain(&pool, "find-me.com").await;
    let repo = PgDomainRepository::new(Arc::new(pool));

    let by_authority = repo.find_by_authority("find-me.com").await.unwrap();
    assert_eq!(by_authority.map(|d| d.id), Some(id));

    let by_id = repo.find_by_id(id).await.unwrap();
    assert_eq!(by_id.unwrap().authority, "find-me.com");

    assert!(repo.find_by_authority("missing.com").await.unwrap().is_none());
    assert!(repo.find_by_id(id + 100).await.unwrap().is_none());
}

#[sqlx::test]
async fn test_find_domains_without(pool: PgPool) {
    common::create_test_domain(&pool, "zeta.com").await;
    common::create_test_domain(&pool, "s.test").await;
    let alpha = common::create_test_domain(&pool, "alpha.com").await;
    let repo = PgDomainRepository::new(Arc::new(pool));

    let all = repo
        .find_domains_without("s.test".to_string(), None)
        .await
        .unwrap();
    let authorities: Vec<_> = all.iter().map(|d| d.authority.as_str()).collect();
    assert_eq!(authorities, vec!["alpha.com", "zeta.com"]);

    let unrestricted = repo
        .find_domains_without("s.test".to_string(), Some(VisibilitySpec::default()))
        .await
        .unwrap();
    assert_eq!(unrestricted.len(), 2);

    let scoped = repo
        .find_domains_without(
            "s.test".to_string(),
            Some(VisibilitySpec {
                author_api_key_id: None,
                domain_id: Some(alpha),
            }),
        )
        .await
        .unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].authority, "alpha.com");
}

#[sqlx::test]
async fn test_save_redirects(pool: PgPool) {
    let id = common::create_test_domain(&pool, "redirects.com").await;
    let repo = PgDomainRepository::new(Arc::new(pool));

    let redirects = NotFoundRedirects::new(
        Some("https://base".to_string()),
        Some("https://404".to_string()),
        None,
    );
    let saved = repo.save_redirects(id, redirects.clone()).await.unwrap();
    assert_eq!(saved.redirects, redirects);

    let cleared = repo
        .save_redirects(id, NotFoundRedirects::default())
        .await
        .unwrap();
    assert!(!cleared.redirects.has_any());

    let result = repo.save_redirects(id + 100, redirects).await;
    assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
}
