//! Store error type.

use std::path::PathBuf;

/// Error raised by a [`KeyValueStore`](crate::KeyValueStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O failure while touching the backing file.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File the operation was working on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Stored bytes are not valid UTF-8.
    #[error("stored value for {key} is not valid UTF-8")]
    InvalidUtf8 {
        /// Key whose value could not be decoded.
        key: String,
    },
    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Wrap an I/O error with the path it occurred on.
    #[must_use]
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
