//! Recent searches and favorite places
//!
//! Both lists are JSON arrays of location names kept in a small key-value
//! store that outlives the planning session.

use fjall::Keyspace;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::{Result, TripPlannerError};

pub const RECENT_KEY: &str = "recent";
pub const FAVORITES_KEY: &str = "favorites";
/// Maximum length of the recent list
pub const MAX_RECENT: usize = 5;

/// Minimal string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// On-disk store backed by a fjall keyspace
pub struct FjallStore {
    items: Keyspace,
}

impl FjallStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path)
            .open()
            .map_err(|e| TripPlannerError::store(format!("Failed to open place store: {e}")))?;
        let items = db
            .keyspace("places", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| TripPlannerError::store(format!("Failed to open keyspace: {e}")))?;
        Ok(Self { items })
    }
}

impl KeyValueStore for FjallStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .items
            .get(key.as_bytes())
            .map_err(|e| TripPlannerError::store(e.to_string()))?;
        value
            .map(|bytes| {
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| TripPlannerError::store(format!("Invalid UTF-8 under {key}: {e}")))
            })
            .transpose()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .insert(key.as_bytes().to_vec(), value.as_bytes().to_vec())
            .map_err(|e| TripPlannerError::store(e.to_string()))
    }
}

/// Volatile store, used when no data directory is available and in tests
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| TripPlannerError::store("Memory store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| TripPlannerError::store("Memory store poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Recent and favorite place lists on top of a [`KeyValueStore`]
#[derive(Clone)]
pub struct SavedPlaces {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles on the lists
    write_lock: Arc<Mutex<()>>,
}

impl SavedPlaces {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    fn read_list(&self, key: &str) -> Result<Vec<String>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!("Discarding unreadable {} list: {}", key, e);
                Ok(Vec::new())
            }
        }
    }

    fn write_list(&self, key: &str, list: &[String]) -> Result<()> {
        let raw = serde_json::to_string(list)?;
        self.store.set(key, &raw)
    }

    fn update<T>(&self, key: &str, f: impl FnOnce(&mut Vec<String>) -> T) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| TripPlannerError::store("Saved places lock poisoned"))?;
        let mut list = self.read_list(key)?;
        let out = f(&mut list);
        self.write_list(key, &list)?;
        Ok(out)
    }

    /// Most recent first
    pub fn recent(&self) -> Result<Vec<String>> {
        self.read_list(RECENT_KEY)
    }

    /// Record a searched place. A name already in the list moves to the
    /// front instead of being duplicated; the oldest entry falls off past
    /// [`MAX_RECENT`].
    pub fn push_recent(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        self.update(RECENT_KEY, |recent| {
            recent.retain(|existing| existing != name);
            recent.insert(0, name.to_string());
            recent.truncate(MAX_RECENT);
        })?;
        debug!("Recorded recent search: {}", name);
        Ok(())
    }

    pub fn favorites(&self) -> Result<Vec<String>> {
        self.read_list(FAVORITES_KEY)
    }

    pub fn is_favorite(&self, name: &str) -> Result<bool> {
        Ok(self.favorites()?.iter().any(|f| f == name))
    }

    /// Add or remove a favorite; returns whether it is a favorite afterwards
    pub fn toggle_favorite(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TripPlannerError::validation("Favorite name is empty"));
        }
        self.update(FAVORITES_KEY, |favorites| {
            if let Some(pos) = favorites.iter().position(|f| f == name) {
                favorites.remove(pos);
                false
            } else {
                favorites.push(name.to_string());
                true
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_has_no_duplicates() {
        let places = SavedPlaces::in_memory();
        places.push_recent("Mumbai").unwrap();
        places.push_recent("Pune").unwrap();
        places.push_recent("Mumbai").unwrap();
        assert_eq!(places.recent().unwrap(), vec!["Mumbai", "Pune"]);
    }

    #[test]
    fn test_recent_evicts_oldest() {
        let places = SavedPlaces::in_memory();
        for name in ["Mumbai", "Pune", "Lonavala", "Nashik", "Goa", "Satara"] {
            places.push_recent(name).unwrap();
        }
        let recent = places.recent().unwrap();
        assert_eq!(recent.len(), MAX_RECENT);
        assert_eq!(recent[0], "Satara");
        assert!(!recent.contains(&"Mumbai".to_string()));
    }

    #[test]
    fn test_blank_names_are_ignored() {
        let places = SavedPlaces::in_memory();
        places.push_recent("  ").unwrap();
        assert!(places.recent().unwrap().is_empty());
        assert!(places.toggle_favorite("").is_err());
    }

    #[test]
    fn test_toggle_favorite() {
        let places = SavedPlaces::in_memory();
        assert!(places.toggle_favorite("Lonavala").unwrap());
        assert!(places.is_favorite("Lonavala").unwrap());
        assert!(!places.toggle_favorite("Lonavala").unwrap());
        assert!(!places.is_favorite("Lonavala").unwrap());
    }

    #[test]
    fn test_unreadable_list_is_treated_as_empty() {
        let store = Arc::new(MemoryStore::default());
        store.set(RECENT_KEY, "not json").unwrap();
        let places = SavedPlaces::new(store);
        assert!(places.recent().unwrap().is_empty());
        places.push_recent("Pune").unwrap();
        assert_eq!(places.recent().unwrap(), vec!["Pune"]);
    }

    #[test]
    fn test_fjall_store_holds_json_lists() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FjallStore::open(dir.path()).unwrap());
        let places = SavedPlaces::new(store.clone());

        places.push_recent("Mumbai").unwrap();
        places.toggle_favorite("Pune").unwrap();

        assert_eq!(
            store.get(RECENT_KEY).unwrap().as_deref(),
            Some(r#"["Mumbai"]"#)
        );
        assert_eq!(places.favorites().unwrap(), vec!["Pune"]);
        assert!(store.get("missing").unwrap().is_none());
    }
}
