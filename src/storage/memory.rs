//! In-process token storage

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{StorageError, TokenStorage};

/// Token storage that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::TokenPair;
    use crate::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    #[test]
    fn pair_is_stored_under_fixed_keys() {
        let storage = MemoryStorage::new();
        storage
            .store_pair(&TokenPair {
                access: "acc".to_string(),
                refresh: "ref".to_string(),
            })
            .unwrap();

        assert_eq!(storage.get(ACCESS_TOKEN_KEY).as_deref(), Some("acc"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).as_deref(), Some("ref"));
    }

    #[test]
    fn clear_removes_both_tokens() {
        let storage = MemoryStorage::new();
        storage.set(ACCESS_TOKEN_KEY, "acc").unwrap();
        storage.set(REFRESH_TOKEN_KEY, "ref").unwrap();
        storage.set("theme", "dark").unwrap();

        storage.clear().unwrap();

        assert!(storage.access_token().is_none());
        assert!(storage.refresh_token().is_none());
        assert_eq!(storage.get("theme").as_deref(), Some("dark"));
    }
}
