#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;
use urlkeeper::domain::entities::{ApiKeyRole, NotFoundRedirects};
use urlkeeper::domain::visit_worker::run_visit_worker;
use urlkeeper::infrastructure::cache::NullCache;
use urlkeeper::prelude::*;
use urlkeeper::routes::router;

pub const DEFAULT_DOMAIN: &str = "s.test";

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// A server over in-memory storage, with an admin key ready to use.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub admin_key: String,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_redirects(NotFoundRedirects::default()).await
    }

    pub async fn with_redirects(not_found_redirects: NotFoundRedirects) -> Self {
        let repositories = Repositories::in_memory();
        let (visit_tx, visit_rx) = mpsc::channel(100);
        tokio::spawn(run_visit_worker(
            visit_rx,
            repositories.visits.clone(),
            repositories.short_urls.clone(),
        ));

        let state = AppState::new(
            &repositories,
            Arc::new(NullCache::new()),
            visit_tx,
            ShortenerOptions {
                default_domain: DEFAULT_DOMAIN.to_string(),
                short_url_schema: "https".to_string(),
                default_short_codes_length: 5,
                redirect_status_code: 302,
                not_found_redirects,
                secret: "test-signing-secret".to_string(),
                behind_proxy: false,
            },
        );

        let (_, admin_key) = state
            .api_key_service
            .create("admin", None, vec![])
            .await
            .unwrap();

        let app = router(state.clone(), false).layer(MockConnectInfoLayer);
        let server = TestServer::new(app).unwrap();

        Self {
            server,
            state,
            admin_key,
        }
    }

    /// Issues a key restricted by `roles`.
    pub async fn key_with_roles(&self, name: &str, roles: Vec<ApiKeyRole>) -> String {
        self.state
            .api_key_service
            .create(name, None, roles)
            .await
            .unwrap()
            .1
    }

    /// Issues a key restricted to `authority`, creating the domain if needed.
    pub async fn domain_key(&self, name: &str, authority: &str) -> String {
        let domain = self
            .state
            .domain_service
            .get_or_create(authority)
            .await
            .unwrap();
        self.key_with_roles(name, vec![ApiKeyRole::for_domain(&domain)])
            .await
    }

    /// Creates a short URL through the API and returns its JSON.
    pub async fn create_short_url(&self, key: &str, body: serde_json::Value) -> serde_json::Value {
        let response = self
            .server
            .post("/api/short-urls")
            .add_header("Authorization", bearer(key))
            .json(&body)
            .await;
        response.assert_status_ok();
        response.json()
    }
}

pub fn bearer(key: &str) -> String {
    format!("Bearer {key}")
}

/// Visits are recorded by a background task; polls until `check` holds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..50 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not met in time");
}

pub async fn create_test_domain(pool: &PgPool, authority: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("INSERT INTO domains (authority) VALUES ($1) RETURNING id")
        .bind(authority)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_api_key(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO api_keys (name, key_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(format!("hash-{name}"))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_short_url(
    pool: &PgPool,
    code: &str,
    long_url: &str,
    domain_id: Option<i64>,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO short_urls (short_code, long_url, domain_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(code)
    .bind(long_url)
    .bind(domain_id)
    .fetch_one(pool)
    .await
    .unwrap()
}
