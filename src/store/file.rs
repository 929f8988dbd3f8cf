use super::{PreferenceStore, StoreError};
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Preferences kept as one JSON object in a file.
///
/// Every write re-reads the file first, so concurrent CLI processes see each
/// other's keys; the last writer of a given key wins.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Map<String, Value> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                log::warn!("Could not read {}: {}", self.path.display(), e);
                return Map::new();
            }
        };
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                log::warn!(
                    "Preference file {} is corrupt, starting from empty",
                    self.path.display()
                );
                Map::new()
            }
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Map<String, Value>)) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_all();
        apply(&mut map);
        self.write_all(&map)
    }
}

impl PreferenceStore for FileStore {
    fn get_raw(&self, key: &str) -> Option<Value> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_all().remove(key)
    }

    fn set_raw(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.update(|map| {
            map.insert(key.to_string(), value);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PreferenceStoreExt;
    use tempfile::tempdir;

    #[test]
    fn values_survive_a_new_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");

        FileStore::new(&path).set("filterType", "monthly").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get::<String>("filterType").as_deref(), Some("monthly"));
    }

    #[test]
    fn writes_keep_other_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("preferences.json"));
        store.set("startDate", &100i64).unwrap();
        store.set("endDate", &200i64).unwrap();
        store.set("startDate", &150i64).unwrap();

        assert_eq!(store.get::<i64>("startDate"), Some(150));
        assert_eq!(store.get::<i64>("endDate"), Some(200));
    }

    #[test]
    /// A corrupt file reads as empty and is replaced on the next write.
    fn corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::new(&path);
        assert!(store.get_raw("dashboardFavorites").is_none());

        store.set("selectedTeams", &vec![1u64]).unwrap();
        assert_eq!(store.get::<Vec<u64>>("selectedTeams"), Some(vec![1]));
    }
}
