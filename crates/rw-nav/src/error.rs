//! Error types for navigation and table-of-contents construction.

use std::path::PathBuf;

/// Error loading or validating a navigation tree.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// Navigation file could not be read.
    #[error("failed to read navigation file {}: {source}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Navigation file extension is neither YAML nor JSON.
    #[error("unsupported navigation file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// A node has an empty title, so it has no usable identity.
    #[error("empty title under {parent}")]
    EmptyTitle {
        /// Node path of the parent (empty at the top level).
        parent: String,
    },
    /// Two siblings share a title, so their node paths would collide.
    #[error("duplicate title {title:?} under {parent}")]
    DuplicateTitle {
        /// Node path of the parent (empty at the top level).
        parent: String,
        /// The repeated title.
        title: String,
    },
    /// Two nodes link to the same internal page.
    #[error("duplicate href {href:?} at {first} and {second}")]
    DuplicateHref {
        /// The repeated link target.
        href: String,
        /// Node path of the first node carrying it.
        first: String,
        /// Node path of the second node carrying it.
        second: String,
    },
    /// Two nodes resolve to the same node path key, e.g. a top-level `A/B`
    /// next to a nested `A > B`.
    #[error("node path {path} is used by more than one node")]
    DuplicatePath {
        /// The shared node path key.
        path: String,
    },
}

/// Error building a table of contents from heading entries.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TocError {
    /// A subsection heading appeared before any section heading.
    #[error("heading {id:?} (level {level}) has no preceding section heading")]
    OrphanSubsection {
        /// Anchor id of the orphaned heading.
        id: String,
        /// Heading level of the orphaned heading.
        level: u8,
    },
    /// Two headings share an anchor id, so activation would be ambiguous.
    #[error("duplicate heading id {0:?}")]
    DuplicateId(String),
}
