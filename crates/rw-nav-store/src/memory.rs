//! In-memory store implementation for testing.
//!
//! Provides [`MemoryStore`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{KeyValueStore, StoreError};

/// In-memory store for testing.
///
/// Use the builder methods to seed entries or simulate an unavailable
/// backend. Every successful `set` is counted so tests can assert when
/// persistence did (or did not) happen.
///
/// # Example
///
/// ```ignore
/// use rw_nav_store::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::new().with_entry("open-sections", r#"{"/A":true}"#);
/// assert_eq!(store.writes(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries
            .write()
            .unwrap()
            .insert(key.into(), value.into());
        self
    }

    /// Make every operation fail with [`StoreError::Unavailable`].
    #[must_use]
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Toggle failure mode on an existing store.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current raw value for `key`, bypassing failure mode.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store set to fail".to_owned()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries
            .write()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}
