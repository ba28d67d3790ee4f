//! Extension trait for [`KeyValueStore`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{KeyValueStore, StoreError};

/// Typed JSON access for [`KeyValueStore`].
///
/// Implemented as default methods on an extension trait so that
/// [`KeyValueStore`] stays object-safe and implementors only deal with
/// strings. A blanket impl makes the methods available on every store,
/// including `dyn KeyValueStore`.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use rw_nav_store::{KeyValueStoreExt, NullStore};
///
/// let store = NullStore;
/// let mut state = BTreeMap::new();
/// state.insert("/Guides".to_owned(), true);
///
/// store.set_json("open-sections", &state).unwrap();
/// let loaded: Option<BTreeMap<String, bool>> = store.get_json("open-sections").unwrap();
/// assert!(loaded.is_none());
/// ```
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and JSON-decode the value under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent, and an error when the stored
    /// value is not valid JSON for `T`.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// JSON-encode `value` and store it under `key`.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
