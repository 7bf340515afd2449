//! Persisted key/value storage for the session token pair

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::api::types::TokenPair;

/// Storage key for the short-lived access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Local key/value storage holding plain string values.
///
/// Implementations must be cheap to call from async code: no method
/// may block on the network.
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    fn store_pair(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        self.set(ACCESS_TOKEN_KEY, &tokens.access)?;
        self.set(REFRESH_TOKEN_KEY, &tokens.refresh)
    }

    /// Remove both tokens
    fn clear(&self) -> Result<(), StorageError> {
        self.remove(ACCESS_TOKEN_KEY)?;
        self.remove(REFRESH_TOKEN_KEY)
    }
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
