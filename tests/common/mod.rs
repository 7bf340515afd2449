#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::MockServer;

use powerdealer_client::router::Route;
use powerdealer_client::storage::{MemoryStorage, TokenStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use powerdealer_client::{AppContext, Config};

/// Context talking to `server` under the `/api` prefix, with in-memory tokens
pub fn context(server: &MockServer) -> AppContext {
    let config = Config::for_api(&format!("{}/api", server.uri())).unwrap();
    AppContext::with_storage(config, Arc::new(MemoryStorage::new()))
}

pub fn context_with_tokens(server: &MockServer, access: &str, refresh: Option<&str>) -> AppContext {
    let ctx = context(server);
    ctx.storage.set(ACCESS_TOKEN_KEY, access).unwrap();
    if let Some(refresh) = refresh {
        ctx.storage.set(REFRESH_TOKEN_KEY, refresh).unwrap();
    }
    ctx
}

pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "message": "ok", "data": data })
}

pub fn error_body(message: &str) -> Value {
    json!({ "success": false, "message": message, "errors": {} })
}

pub fn user_json() -> Value {
    json!({ "id": 1, "username": "a", "email": "a@example.com" })
}

pub fn business_json(name: &str) -> Value {
    json!({
        "id": 7,
        "name": name,
        "description": "",
        "email": "biz@example.com",
        "phone": "",
        "address": "",
        "created_at": "2024-01-02T03:04:05Z",
        "updated_at": "2024-01-02T03:04:05Z"
    })
}

pub fn auth_payload(access: &str, refresh: &str) -> Value {
    envelope(json!({
        "user": user_json(),
        "business": business_json("Acme"),
        "tokens": { "access": access, "refresh": refresh }
    }))
}

pub fn profile_payload() -> Value {
    envelope(json!({ "user": user_json(), "business": business_json("Acme") }))
}

/// Wait for the event listener to move the router to `/login`
pub async fn wait_for_login_redirect(ctx: &AppContext) -> bool {
    for _ in 0..100 {
        if ctx.router.current() == Some(Route::Login) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
