mod common;

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use powerdealer_client::api::error::MSG_NOT_FOUND;
use powerdealer_client::api::types::BusinessPatch;

use common::*;

#[tokio::test]
async fn update_diverges_from_auth_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_payload("acc", "ref")))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/business/"))
        .and(header("authorization", "Bearer acc"))
        .and(body_json(json!({ "name": "X" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(business_json("X"))))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    assert_ok!(ctx.auth.login("a", "b").await);

    let patch = BusinessPatch {
        name: Some("X".to_string()),
        ..Default::default()
    };
    let updated = assert_ok!(ctx.business.update_business(&patch).await);

    assert_eq!(updated.name, "X");
    assert_eq!(ctx.business.business().unwrap().name, "X");
    assert_eq!(ctx.auth.business().unwrap().name, "Acme");
    assert!(!ctx.business.loading());
    assert!(ctx.business.error().is_none());
}

#[tokio::test]
async fn fetch_replaces_business() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/business/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(business_json("Fresh"))))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context_with_tokens(&server, "acc", Some("ref"));
    ctx.business.set_business(None);

    assert_ok!(ctx.business.fetch_business().await);
    assert_eq!(ctx.business.business().unwrap().name, "Fresh");
}

#[tokio::test]
async fn fetch_failure_keeps_previous_business() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/business/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let ctx = context_with_tokens(&server, "acc", Some("ref"));
    let existing = serde_json::from_value(business_json("Cached")).unwrap();
    ctx.business.set_business(Some(existing));

    assert_err!(ctx.business.fetch_business().await);
    assert_eq!(ctx.business.error().as_deref(), Some(MSG_NOT_FOUND));
    assert_eq!(ctx.business.business().unwrap().name, "Cached");
}

#[tokio::test]
async fn context_logout_resets_business_store() {
    let server = MockServer::start().await;
    let ctx = context_with_tokens(&server, "acc", Some("ref"));
    ctx.business
        .set_business(Some(serde_json::from_value(business_json("Acme")).unwrap()));

    ctx.logout();

    assert!(ctx.business.business().is_none());
    assert!(!ctx.auth.has_persisted_token());
}
