//! Favorite templates and boards.
//!
//! The local set is authoritative. The server copy is only a mirror, updated
//! best-effort after each toggle and never read back.

use crate::api::DashboardApi;
use crate::api::types::PreferencesUpdate;
use crate::consts::cli_consts::storage_keys;
use crate::store::{PreferenceStore, PreferenceStoreExt, StoreError};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Ids flagged as favorite. Persisted as `{"<id>": true, ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: BTreeSet<u64>,
}

impl FavoriteSet {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        match store.get_raw(storage_keys::FAVORITES) {
            Some(raw) => Self::from_value(raw),
            None => Self::default(),
        }
    }

    /// Accepts the stored object, or the same object encoded as a JSON string.
    /// Entries whose value is not `true` are dropped.
    pub fn from_value(raw: Value) -> Self {
        let raw = match raw {
            Value::String(encoded) => match serde_json::from_str(&encoded) {
                Ok(decoded) => decoded,
                Err(e) => {
                    log::debug!("Ignoring unreadable favorites: {}", e);
                    return Self::default();
                }
            },
            other => other,
        };
        let Value::Object(entries) = raw else {
            log::debug!("Ignoring favorites that are not an object");
            return Self::default();
        };
        let ids = entries
            .into_iter()
            .filter(|(_, flag)| *flag == Value::Bool(true))
            .filter_map(|(key, _)| key.parse::<u64>().ok())
            .collect();
        Self { ids }
    }

    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), StoreError> {
        store.set(storage_keys::FAVORITES, &self.to_wire())
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Flips the flag for `id` and returns the new value.
    pub fn toggle(&mut self, id: u64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn to_wire(&self) -> BTreeMap<u64, bool> {
        self.ids.iter().map(|id| (*id, true)).collect()
    }
}

#[cfg(test)]
impl FavoriteSet {
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<u64> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Mirrors the whole set to the server. Failures are logged and otherwise
/// ignored; the local set is left as it is.
pub async fn sync_favorites(api: &dyn DashboardApi, favorites: &FavoriteSet) -> bool {
    let update = PreferencesUpdate {
        dashboard_favorites: favorites.to_wire(),
    };
    match api.update_preferences(&update).await {
        Ok(()) => {
            log::debug!("Synced {} favorites", favorites.len());
            true
        }
        Err(e) => {
            log::log!(e.log_level().into(), "Failed to sync favorites: {}", e);
            false
        }
    }
}
