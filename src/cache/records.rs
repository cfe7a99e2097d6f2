//! Date-keyed cache of fetched picture records
//!
//! The whole mapping is loaded once and rewritten after every insert. Entries
//! never expire and are never evicted.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::store::{KeyValueStore, StoreError};
use crate::data::PictureRecord;

/// Store key holding the serialized date → record mapping
pub const CACHE_KEY: &str = "apod_cache";

/// In-memory view of the persisted record cache
pub struct RecordCache {
    store: Arc<dyn KeyValueStore>,
    entries: BTreeMap<String, PictureRecord>,
}

impl RecordCache {
    /// Loads the mapping from `store`
    ///
    /// A missing or unreadable blob yields an empty cache.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let entries = match store.get(CACHE_KEY) {
            Some(blob) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable record cache");
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };
        Self { store, entries }
    }

    /// Returns the record cached under a normalized date
    pub fn get(&self, date: &str) -> Option<&PictureRecord> {
        self.entries.get(date)
    }

    /// Stores a record under a normalized date and persists the mapping
    ///
    /// The in-memory entry is kept even if persisting fails.
    pub fn insert(&mut self, date: impl Into<String>, record: PictureRecord) -> Result<(), StoreError> {
        self.entries.insert(date.into(), record);
        let blob = serde_json::to_string(&self.entries)?;
        self.store.set(CACHE_KEY, &blob)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::data::MediaType;

    fn record(date: &str) -> PictureRecord {
        PictureRecord {
            date: date.to_string(),
            title: format!("Picture for {date}"),
            explanation: "A nebula.".to_string(),
            media_type: MediaType::Image,
            url: format!("https://apod.nasa.gov/apod/image/{date}.jpg"),
            hd_url: None,
            service_version: "v1".to_string(),
            copyright: None,
        }
    }

    #[test]
    fn test_load_empty_store() {
        let cache = RecordCache::load(Arc::new(MemoryStore::new()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_persists_whole_mapping() {
        let store = Arc::new(MemoryStore::new());
        let mut cache = RecordCache::load(store.clone());

        cache.insert("2024-07-15", record("2024-07-15")).unwrap();
        cache.insert("2024-07-16", record("2024-07-16")).unwrap();

        let blob = store.get(CACHE_KEY).expect("cache should be persisted");
        let persisted: BTreeMap<String, PictureRecord> = serde_json::from_str(&blob).unwrap();
        assert_eq!(persisted.len(), 2);
        assert_eq!(persisted["2024-07-16"], record("2024-07-16"));
    }

    #[test]
    fn test_reload_sees_previous_entries() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        RecordCache::load(store.clone())
            .insert("2024-07-15", record("2024-07-15"))
            .unwrap();

        let reloaded = RecordCache::load(store);
        assert_eq!(reloaded.get("2024-07-15"), Some(&record("2024-07-15")));
        assert!(reloaded.get("2024-07-16").is_none());
    }

    #[test]
    fn test_corrupt_blob_yields_empty_cache() {
        let store = Arc::new(MemoryStore::new());
        store.set(CACHE_KEY, "{not json").unwrap();

        let cache = RecordCache::load(store);
        assert!(cache.is_empty());
    }
}
