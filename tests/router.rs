mod common;

use std::time::Duration;

use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use powerdealer_client::api::SessionEvent;
use powerdealer_client::router::{Route, RouteError};
use powerdealer_client::storage::{TokenStorage, ACCESS_TOKEN_KEY};

use common::*;

async fn mount_me(server: &MockServer, status: u16, expected_calls: u64) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(profile_payload())
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(template.set_delay(Duration::from_millis(50)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn anonymous_dashboard_redirects_to_login() {
    let server = MockServer::start().await;
    let ctx = context(&server);

    let navigation = assert_ok!(ctx.router.navigate("/dashboard").await);

    assert_eq!(navigation.requested, Route::Dashboard);
    assert_eq!(navigation.route, Route::Login);
    assert!(navigation.redirected());
    assert_eq!(ctx.router.current(), Some(Route::Login));
    assert!(!ctx.router.restoration_attempted());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn root_follows_session_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_payload("acc", "ref")))
        .mount(&server)
        .await;

    let ctx = context(&server);
    assert_eq!(assert_ok!(ctx.router.navigate("/").await).route, Route::Login);

    assert_ok!(ctx.auth.login("a", "b").await);
    assert_eq!(assert_ok!(ctx.router.navigate("/").await).route, Route::Dashboard);
}

#[tokio::test]
async fn authenticated_login_redirects_to_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_payload("acc", "ref")))
        .mount(&server)
        .await;

    let ctx = context(&server);
    assert_ok!(ctx.auth.login("a", "b").await);

    let to_login = assert_ok!(ctx.router.navigate("/login").await);
    assert_eq!(to_login.route, Route::Dashboard);
    let to_signup = assert_ok!(ctx.router.navigate("/signup").await);
    assert_eq!(to_signup.route, Route::Dashboard);
}

#[tokio::test]
async fn reload_with_valid_token_restores_before_guard() {
    let server = MockServer::start().await;
    mount_me(&server, 200, 1).await;

    let ctx = context_with_tokens(&server, "acc", Some("ref"));

    let first = assert_ok!(ctx.router.navigate("/dashboard").await);
    assert_eq!(first.route, Route::Dashboard);
    assert!(ctx.router.restoration_attempted());
    assert!(ctx.auth.is_authenticated());

    let second = assert_ok!(ctx.router.navigate("/dashboard").await);
    assert_eq!(second.route, Route::Dashboard);
}

#[tokio::test]
async fn restoration_runs_once_even_after_failure() {
    let server = MockServer::start().await;
    mount_me(&server, 401, 1).await;

    let ctx = context_with_tokens(&server, "expired", None);

    let first = assert_ok!(ctx.router.navigate("/dashboard").await);
    assert_eq!(first.route, Route::Login);
    assert!(ctx.storage.access_token().is_none());

    ctx.storage.set(ACCESS_TOKEN_KEY, "another").unwrap();
    let second = assert_ok!(ctx.router.navigate("/dashboard").await);
    assert_eq!(second.route, Route::Login);
}

#[tokio::test]
async fn concurrent_first_navigations_share_one_restore() {
    let server = MockServer::start().await;
    mount_me(&server, 200, 1).await;

    let ctx = context_with_tokens(&server, "acc", Some("ref"));

    let (a, b) = tokio::join!(
        ctx.router.navigate("/dashboard"),
        ctx.router.navigate("/login")
    );

    assert_eq!(assert_ok!(a).route, Route::Dashboard);
    assert_eq!(assert_ok!(b).route, Route::Dashboard);
}

#[tokio::test]
async fn unknown_location_is_rejected() {
    let server = MockServer::start().await;
    let ctx = context(&server);

    let err = assert_err!(ctx.router.navigate("/settings").await);
    assert!(matches!(err, RouteError::NotFound(p) if p == "/settings"));
    assert_eq!(ctx.router.current(), None);
}

#[tokio::test]
async fn invalidation_event_forces_login() {
    let server = MockServer::start().await;
    mount_me(&server, 200, 1).await;

    let ctx = context_with_tokens(&server, "acc", Some("ref"));
    assert_ok!(ctx.router.navigate("/dashboard").await);

    ctx.handle_session_event(SessionEvent::Invalidated);

    assert_eq!(ctx.router.current(), Some(Route::Login));
    assert!(!ctx.auth.is_authenticated());
}
