//! Typed record access over the key-value store.
//!
//! Each persisted record is one JSON blob under a fixed key. Loads are
//! lenient (absent or corrupt data reads as `None`); saves report
//! success so owners can log and absorb failures.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::KeyValueStore;

/// A single typed record in the key-value store.
pub struct Repository<T> {
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> Repository<T> {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Load the record, treating an absent or unreadable blob as no data.
    pub fn load(&self, store: &dyn KeyValueStore) -> Option<T> {
        let bytes = store.get(self.key)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = self.key, error = %e, "discarding unreadable record");
                None
            }
        }
    }

    /// Write the record. Returns false (after logging) on failure; the
    /// caller's in-memory state is considered authoritative either way.
    pub fn save(&self, store: &dyn KeyValueStore, value: &T) -> bool {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = self.key, error = %e, "failed to serialize record");
                return false;
            }
        };
        match store.set(self.key, &bytes) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = self.key, error = %e, "failed to persist record");
                false
            }
        }
    }

    /// Remove the record.
    pub fn clear(&self, store: &dyn KeyValueStore) -> bool {
        match store.remove(self.key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = self.key, error = %e, "failed to remove record");
                false
            }
        }
    }
}
