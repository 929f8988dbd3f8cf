//! Local preference storage
//!
//! Small key/value store for UI selection state: favorites, date range and
//! the team, author and branch filters. Values are JSON.

pub mod file;

pub use file::FileStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Preference file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preference encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw access to persisted preferences. Each key is read independently.
pub trait PreferenceStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Option<Value>;

    fn set_raw(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Typed helpers over [`PreferenceStore`].
pub trait PreferenceStoreExt: PreferenceStore {
    /// Reads and decodes a key. Missing or undecodable values yield `None`.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_value(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("Ignoring unreadable preference {}: {}", key, e);
                None
            }
        }
    }

    fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key).unwrap_or_default()
    }

    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.set_raw(key, serde_json::to_value(value)?)
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStoreExt for S {}

/// In-process store, used by tests and as a fallback when no home directory exists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_values_round_trip() {
        let store = MemoryStore::new();
        store.set("selectedTeams", &vec![3u64, 5]).unwrap();
        assert_eq!(store.get::<Vec<u64>>("selectedTeams"), Some(vec![3, 5]));
    }

    #[test]
    /// A value of the wrong shape reads as absent rather than failing.
    fn unreadable_value_reads_as_default() {
        let store = MemoryStore::new();
        store
            .set_raw("selectedTeams", Value::String("not a list".into()))
            .unwrap();
        assert_eq!(store.get::<Vec<u64>>("selectedTeams"), None);
        assert!(store.get_or_default::<Vec<u64>>("selectedTeams").is_empty());
    }
}
