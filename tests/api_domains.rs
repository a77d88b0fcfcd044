mod common;

use common::{DEFAULT_DOMAIN, TestApp, bearer};
use serde_json::{Value, json};

#[tokio::test]
async fn test_list_domains_starts_with_default() {
    let app = TestApp::new().await;
    app.create_short_url(
        &app.admin_key,
        json!({ "long_url": "https://example.com", "domain": "custom.test" }),
    )
    .await;

    let response = app
        .server
        .get("/api/domains")
        .add_header("Authorization", bearer(&app.admin_key))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    let domains = json["domains"]["data"].as_array().unwrap();
    assert_eq!(domains.len(), 2);
    assert_eq!(domains[0]["domain"], DEFAULT_DOMAIN);
    assert_eq!(domains[0]["is_default"], true);
    assert_eq!(domains[1]["domain"], "custom.test");
    assert_eq!(domains[1]["is_default"], false);
}

#[tokio::test]
async fn test_domain_key_lists_only_its_domain() {
    let app = TestApp::new().await;
    app.create_short_url(
        &app.admin_key,
        json!({ "long_url": "https://example.com", "domain": "other.test" }),
    )
    .await;
    let key = app.domain_key("scoped", "mine.test").await;

    let response = app
        .server
        .get("/api/domains")
        .add_header("Authorization", bearer(&key))
        .await;

    let json = response.json::<Value>();
    assert_eq!(
        json["domains"]["data"],
        json!([{
            "domain": "mine.test",
            "is_default": false,
            "redirects": {
                "base_url_redirect": null,
                "regular_404_redirect": null,
                "invalid_short_url_redirect": null
            }
        }])
    );
}

#[tokio::test]
async fn test_set_domain_redirects() {
    let app = TestApp::new().await;

    let response = app
        .server
        .patch("/api/domains/redirects")
        .add_header("Authorization", bearer(&app.admin_key))
        .json(&json!({
            "domain": "New.Test",
            "regular_404_redirect": "https://example.com/404",
            "invalid_short_url_redirect": ""
        }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["domain"], "new.test");
    assert_eq!(json["base_url_redirect"], Value::Null);
    assert_eq!(json["regular_404_redirect"], "https://example.com/404");
    assert_eq!(json["invalid_short_url_redirect"], Value::Null);
}

#[tokio::test]
async fn test_set_domain_redirects_rejects_default_domain_and_bad_urls() {
    let app = TestApp::new().await;

    let default = app
        .server
        .patch("/api/domains/redirects")
        .add_header("Authorization", bearer(&app.admin_key))
        .json(&json!({ "domain": DEFAULT_DOMAIN }))
        .await;
    assert_eq!(default.status_code(), 400);

    let bad_url = app
        .server
        .patch("/api/domains/redirects")
        .add_header("Authorization", bearer(&app.admin_key))
        .json(&json!({ "domain": "x.test", "base_url_redirect": "not a url" }))
        .await;
    assert_eq!(bad_url.status_code(), 400);
}

#[tokio::test]
async fn test_domain_key_configures_its_own_domain() {
    let app = TestApp::new().await;
    let key = app.domain_key("scoped", "mine.test").await;

    let response = app
        .server
        .patch("/api/domains/redirects")
        .add_header("Authorization", bearer(&key))
        .json(&json!({ "domain": "other.test", "base_url_redirect": "https://example.com" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["domain"], "mine.test");
}
