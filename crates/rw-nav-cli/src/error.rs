//! CLI error types.

use rw_nav::{NavigationError, TocError};
use rw_nav_config::ConfigError;
use rw_nav_store::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Navigation(#[from] NavigationError),

    #[error("{0}")]
    Toc(#[from] TocError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}
