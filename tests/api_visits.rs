mod common;

use common::{DEFAULT_DOMAIN, TestApp, bearer, eventually};
use serde_json::{Value, json};
use urlkeeper::domain::entities::ApiKeyRole;

#[tokio::test]
async fn test_short_url_visits_are_paginated() {
    let app = &TestApp::new().await;
    app.create_short_url(
        &app.admin_key,
        json!({ "long_url": "https://example.com", "custom_slug": "hits" }),
    )
    .await;

    for _ in 0..3 {
        let response = app.server.get("/hits").add_header("Host", DEFAULT_DOMAIN).await;
        assert_eq!(response.status_code(), 302);
    }

    eventually(|| async move {
        let short_url = app
            .server
            .get("/api/short-urls/hits")
            .add_header("Authorization", bearer(&app.admin_key))
            .await
            .json::<Value>();
        short_url["visits_count"] == 3
    })
    .await;

    let response = app
        .server
        .get("/api/short-urls/hits/visits")
        .add_query_param("items_per_page", "2")
        .add_header("Authorization", bearer(&app.admin_key))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["visits"]["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["visits"]["pagination"]["total_items"], 3);
    assert_eq!(json["visits"]["pagination"]["pages_count"], 2);
}

#[tokio::test]
async fn test_visits_of_unknown_short_url() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get("/api/short-urls/unknown/visits")
        .add_header("Authorization", bearer(&app.admin_key))
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_visits_filtered_by_date() {
    let app = &TestApp::new().await;
    app.create_short_url(
        &app.admin_key,
        json!({ "long_url": "https://example.com", "custom_slug": "dated" }),
    )
    .await;
    app.server.get("/dated").add_header("Host", DEFAULT_DOMAIN).await;

    eventually(|| async move {
        let visits = app
            .server
            .get("/api/short-urls/dated/visits")
            .add_header("Authorization", bearer(&app.admin_key))
            .await
            .json::<Value>();
        visits["visits"]["pagination"]["total_items"] == 1
    })
    .await;

    let response = app
        .server
        .get("/api/short-urls/dated/visits")
        .add_query_param("end_date", "2000-01-01T00:00:00Z")
        .add_header("Authorization", bearer(&app.admin_key))
        .await;

    assert_eq!(response.json::<Value>()["visits"]["pagination"]["total_items"], 0);
}

#[tokio::test]
async fn test_orphan_visits_require_admin_key() {
    let app = TestApp::new().await;
    let key = app
        .key_with_roles("author", vec![ApiKeyRole::AuthoredShortUrls])
        .await;

    let response = app
        .server
        .get("/api/visits/orphan")
        .add_header("Authorization", bearer(&key))
        .await;

    assert_eq!(response.status_code(), 403);
}
