//! API error type and user-facing classification

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::storage::StorageError;

/// Shown when no response was received at all
pub const MSG_UNREACHABLE: &str = "Server not reachable. Check your connection.";
pub const MSG_BAD_REQUEST: &str = "Please check your input.";
pub const MSG_UNAUTHORIZED: &str = "Login required.";
pub const MSG_FORBIDDEN: &str = "You don't have permission.";
pub const MSG_NOT_FOUND: &str = "Not found.";
pub const MSG_SERVER_ERROR: &str = "Server problem. Try later.";
pub const MSG_FALLBACK: &str = "Something went wrong.";

/// Error envelope returned by the API on failure:
/// `{ "success": false, "message": "...", "errors": {...} }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Value>>,
}

impl ErrorBody {
    /// Parse a raw response body, tolerating non-JSON payloads
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }
}

/// Failure category of an API call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkUnreachable,
    AuthenticationRequired,
    PermissionDenied,
    NotFound,
    ServerError,
    ValidationError,
    Unknown,
}

/// API client errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("API error (status {status})")]
    Status { status: StatusCode, body: ErrorBody },

    #[error("Failed to parse response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid request path {0}")]
    Url(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::NetworkUnreachable,
            ApiError::Status { status, .. } => match status.as_u16() {
                400 => ErrorKind::ValidationError,
                401 => ErrorKind::AuthenticationRequired,
                403 => ErrorKind::PermissionDenied,
                404 => ErrorKind::NotFound,
                500 => ErrorKind::ServerError,
                _ => ErrorKind::Unknown,
            },
            ApiError::Decode(_)
            | ApiError::Encode(_)
            | ApiError::Url(_)
            | ApiError::Storage(_) => ErrorKind::Unknown,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// A server-supplied message wins over the fixed per-status text.
    pub fn user_message(&self) -> String {
        if let ApiError::Status { body, .. } = self {
            if let Some(message) = body.message.as_deref().filter(|m| !m.trim().is_empty()) {
                return message.to_string();
            }
        }

        match self.kind() {
            ErrorKind::NetworkUnreachable => MSG_UNREACHABLE,
            ErrorKind::ValidationError => MSG_BAD_REQUEST,
            ErrorKind::AuthenticationRequired => MSG_UNAUTHORIZED,
            ErrorKind::PermissionDenied => MSG_FORBIDDEN,
            ErrorKind::NotFound => MSG_NOT_FOUND,
            ErrorKind::ServerError => MSG_SERVER_ERROR,
            ErrorKind::Unknown => MSG_FALLBACK,
        }
        .to_string()
    }

    /// Field name → validation message, empty when the server sent none
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        let ApiError::Status { body, .. } = self else {
            return BTreeMap::new();
        };
        let Some(errors) = &body.errors else {
            return BTreeMap::new();
        };

        errors
            .iter()
            .filter_map(|(field, value)| field_message(value).map(|m| (field.clone(), m)))
            .collect()
    }
}

fn field_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(field_message).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
