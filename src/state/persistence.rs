use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

/// The one key carrying the chosen image across views and reloads
pub const SELECTED_IMAGE_KEY: &str = "selected_image_url";

/// Shared handle to the persisted image selection.
///
/// Navigation passes the URL along directly; this store only exists so the
/// editor can come back after a reload. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct SourceStore {
    inner: Arc<Mutex<Option<String>>>,
}

impl SourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from eframe storage (localStorage on the web)
    pub fn load_from(storage: &dyn eframe::Storage) -> Self {
        let store = Self::new();
        if let Some(url) = storage.get_string(SELECTED_IMAGE_KEY) {
            if !url.is_empty() {
                debug!("Restored {SELECTED_IMAGE_KEY}={url}");
                store.set(url);
            }
        }
        store
    }

    /// Write the current value back. An empty string marks "cleared".
    pub fn save_to(&self, storage: &mut dyn eframe::Storage) {
        let value = self.get().unwrap_or_default();
        storage.set_string(SELECTED_IMAGE_KEY, value);
    }

    pub fn get(&self) -> Option<String> {
        self.inner.lock().clone()
    }

    pub fn set(&self, url: impl Into<String>) {
        *self.inner.lock() = Some(url.into());
    }

    pub fn clear(&self) {
        if self.inner.lock().take().is_some() {
            debug!("Cleared {SELECTED_IMAGE_KEY}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    struct MemoryStorage(HashMap<String, String>);

    impl eframe::Storage for MemoryStorage {
        fn get_string(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }

        fn set_string(&mut self, key: &str, value: String) {
            self.0.insert(key.to_owned(), value);
        }

        fn flush(&mut self) {}
    }

    #[test]
    fn test_clones_share_value() {
        let store = SourceStore::new();
        let other = store.clone();
        store.set("https://images.example.com/a.jpg");
        assert_eq!(other.get().as_deref(), Some("https://images.example.com/a.jpg"));
        other.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_survives_storage_round_trip() {
        let mut storage = MemoryStorage::default();
        let store = SourceStore::new();
        store.set("https://images.example.com/b.jpg");
        store.save_to(&mut storage);

        let restored = SourceStore::load_from(&storage);
        assert_eq!(restored.get().as_deref(), Some("https://images.example.com/b.jpg"));

        restored.clear();
        restored.save_to(&mut storage);
        assert_eq!(SourceStore::load_from(&storage).get(), None);
    }
}
