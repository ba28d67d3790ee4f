//! Persisted key-value store for RW navigation state.
//!
//! Navigation state (which sidebar branches are expanded) survives reloads by
//! living in a small durable store, one string value per key. This crate
//! decouples consumers from where that store actually lives:
//!
//! - [`KeyValueStore`]: read/write/remove string values by key
//! - [`KeyValueStoreExt`]: typed JSON access on top of any store
//!
//! # Implementations
//!
//! - [`NullStore`]: No-op implementation (always empty, writes discarded)
//! - [`FileStore`]: One file per key under a root directory
//! - [`MemoryStore`]: In-memory store for tests (behind the `mock` feature)
//!
//! # Example
//!
//! ```
//! use rw_nav_store::{KeyValueStore, NullStore};
//!
//! let store = NullStore;
//! store.set("open-sections", "{}").unwrap();
//! assert_eq!(store.get("open-sections").unwrap(), None); // NullStore never keeps data
//! ```

mod error;
mod ext;
mod file;
#[cfg(any(test, feature = "mock"))]
mod memory;

pub use error::StoreError;
pub use ext::KeyValueStoreExt;
pub use file::FileStore;
#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryStore;

/// Durable string store keyed by a fixed namespace string.
///
/// Implementations must be safe to share between threads, although the
/// navigation layer only ever writes from a single logical writer.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing was ever written for the key.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the value stored under `key`.
    ///
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// No-op [`KeyValueStore`].
///
/// Every `get` returns `None`; every `set` and `remove` is silently discarded.
/// Use when persistence is disabled.
pub struct NullStore;

impl KeyValueStore for NullStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
