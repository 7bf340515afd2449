//! HTTP client for the Powerdealer REST API
//!
//! Every request reads the access token from persisted storage and sends
//! it as a bearer header. A 401 triggers at most one refresh of the
//! access token followed by one replay of the original request.

use std::sync::Arc;

use reqwest::{header, Client, Method, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::error::{ApiError, ErrorBody};
use super::events::SessionEvent;
use super::token::decode_claims;
use super::types::{RefreshRequest, RefreshResponse};
use crate::storage::{TokenStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Refresh endpoint, relative to the API base
pub const REFRESH_PATH: &str = "token/refresh/";

/// A replayable API request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    /// Set once the request has gone through a refresh attempt
    retry: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retry: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// API client bound to one base URL and one token store
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    storage: Arc<dyn TokenStorage>,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    pub fn new(
        base_url: Url,
        storage: Arc<dyn TokenStorage>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url,
            storage,
            events,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.storage
    }

    /// Subscribe to session events raised by this client
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Resolve an API path against the base URL
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| ApiError::Url(path.to_string()))
    }

    /// Send a request, recovering once from an expired access token.
    ///
    /// Non-2xx responses come back as `ApiError::Status`.
    pub async fn send(&self, mut request: ApiRequest) -> Result<Response, ApiError> {
        loop {
            let response = self.dispatch(&request).await?;

            if response.status() == StatusCode::UNAUTHORIZED && !request.retry {
                request.retry = true;
                if self.refresh_access_token().await {
                    debug!(method = %request.method, path = %request.path, "Replaying request after token refresh");
                    continue;
                }
            }

            return Self::ensure_success(&request, response).await;
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(ApiRequest::get(path)).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::new(Method::POST, path).json(body)?;
        let response = self.send(request).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = ApiRequest::new(Method::PUT, path).json(body)?;
        let response = self.send(request).await?;
        response.json().await.map_err(ApiError::Decode)
    }

    /// Issue one HTTP round trip with the current bearer token attached
    async fn dispatch(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let url = self.url(&request.path)?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = self.storage.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| {
            warn!(method = %request.method, path = %request.path, error = %e, "Network error");
            ApiError::Network(e)
        })
    }

    async fn ensure_success(request: &ApiRequest, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let body = ErrorBody::parse(&raw);
        warn!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            message = body.message.as_deref().unwrap_or(""),
            "API error"
        );
        Err(ApiError::Status { status, body })
    }

    /// Exchange the persisted refresh token for a new access token.
    ///
    /// Returns false without touching storage when no refresh token is
    /// persisted. On refresh failure both tokens are removed and
    /// `SessionEvent::Invalidated` is emitted.
    async fn refresh_access_token(&self) -> bool {
        let Some(refresh) = self.storage.refresh_token() else {
            debug!("No refresh token persisted, skipping refresh");
            return false;
        };

        match self.request_refresh(&refresh).await {
            Ok(()) => {
                info!("Access token refreshed");
                let _ = self.events.send(SessionEvent::Refreshed);
                true
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, invalidating session");
                if let Err(e) = self.storage.clear() {
                    warn!(error = %e, "Failed to clear persisted tokens");
                }
                let _ = self.events.send(SessionEvent::Invalidated);
                false
            }
        }
    }

    /// Bare refresh call: no bearer header and no refresh-on-401
    async fn request_refresh(&self, refresh: &str) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::POST, REFRESH_PATH);
        let response = self
            .client
            .post(self.url(REFRESH_PATH)?)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&RefreshRequest { refresh })
            .send()
            .await
            .map_err(ApiError::Network)?;

        let response = Self::ensure_success(&request, response).await?;
        let tokens: RefreshResponse = response.json().await.map_err(ApiError::Decode)?;

        if let Some(expires_at) = decode_claims(&tokens.access).and_then(|c| c.expires_at()) {
            debug!(%expires_at, "New access token issued");
        }

        self.storage.set(ACCESS_TOKEN_KEY, &tokens.access)?;
        if let Some(rotated) = tokens.refresh.as_deref() {
            self.storage.set(REFRESH_TOKEN_KEY, rotated)?;
        }
        Ok(())
    }
}
