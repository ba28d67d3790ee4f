//! File-based store implementation.
//!
//! [`FileStore`] keeps each key in its own file under a root directory. Keys
//! are percent-encoded into file names, so any string is a valid key:
//!
//! ```text
//! {root}/
//! +-- quartz-open-sections     # key "quartz-open-sections"
//! +-- docs%2Fsidebar           # key "docs/sidebar"
//! ```
//!
//! Writes go to a sibling `.tmp` file first and are renamed into place, so a
//! reader never observes a half-written value.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{KeyValueStore, StoreError};

/// Characters escaped in file names: everything except `A-Z a-z 0-9 - _`.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// File-based [`KeyValueStore`] rooted at a directory on disk.
///
/// The root directory is created lazily on the first write.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let name = utf8_percent_encode(key, KEY_ENCODE_SET).to_string();
        // An empty key still needs a file name
        if name.is_empty() {
            self.root.join("%")
        } else {
            self.root.join(name)
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(e, path)),
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StoreError::InvalidUtf8 {
                key: key.to_owned(),
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(e, &self.root))?;

        let path = self.key_path(key);
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, value).map_err(|e| StoreError::io(e, &tmp))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(e, &path))?;

        tracing::debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(e, path)),
        }
    }
}
