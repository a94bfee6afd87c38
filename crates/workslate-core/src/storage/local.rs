//! Persistence of the slide collection under a single namespaced key.

use super::{DEFAULT_STORAGE_KEY, Storage, StorageError, StorageResult};
use crate::document::Slide;
use crate::project;
use log::{error, warn};

/// Saves and restores slides through a [`Storage`] backend.
///
/// Failures never propagate into editing: a full store is logged and the
/// document keeps working in memory, a corrupt payload is discarded.
pub struct LocalStore {
    storage: Box<dyn Storage>,
    key: String,
}

impl LocalStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: Box<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialize and write every slide.
    pub fn save(&self, slides: &[Slide]) -> StorageResult<()> {
        let json = project::to_json(slides).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(&self.key, &json)
    }

    /// Read the persisted slides. Missing, corrupt or non-array payloads
    /// yield `None`.
    pub fn load(&self) -> Option<Vec<Slide>> {
        let data = match self.storage.get(&self.key) {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => return None,
            Err(e) => {
                warn!("Failed to read saved slides: {e}");
                return None;
            }
        };
        match project::from_json(&data) {
            Ok(slides) => Some(slides),
            Err(e) => {
                error!("Save corrupted: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_round_trip() {
        let store = LocalStore::new(Box::new(MemoryStorage::new()));
        let slides: Vec<Slide> = vec![vec![Rectangle::new(0.0, 0.0, 10.0, 10.0).into()], vec![]];
        store.save(&slides).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0][0].kind(), "rect");
    }

    #[test]
    fn test_missing_and_corrupt() {
        let storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let store = LocalStore::new(Box::new(storage));
        assert!(store.load().is_none());

        let storage = MemoryStorage::new();
        storage.set(DEFAULT_STORAGE_KEY, r#"{"slides": []}"#).unwrap();
        let store = LocalStore::new(Box::new(storage));
        assert!(store.load().is_none());

        let store = LocalStore::new(Box::new(MemoryStorage::new()));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_quota_exceeded_is_reported() {
        let store = LocalStore::new(Box::new(MemoryStorage::with_quota(20)));
        let slides: Vec<Slide> = vec![vec![Rectangle::new(0.0, 0.0, 10.0, 10.0).into()]];
        assert!(matches!(store.save(&slides), Err(StorageError::QuotaExceeded { .. })));
    }
}
