//! Sidebar, table-of-contents and scroll position synchronization for RW.
//!
//! This crate keeps three views of a documentation page in agreement:
//!
//! - [`NavigationController`]: the sidebar tree with per-row open/active
//!   state, forced-open ancestors of the current page, and persisted
//!   expand/collapse state through [`ExpansionStore`]
//! - [`TableOfContents`]: the two-level "On this page" list
//! - [`ScrollSpy`]: the heading the reader is currently at
//!
//! The sidebar and the table of contents are independent and share no state.
//! Platform coupling is behind small capabilities: [`KeyValueStore`] for
//! persistence, [`RevealTarget`] for scrolling a row into view, and
//! [`IntersectionSource`] for heading observation.
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use std::time::Instant;
//! use rw_nav::{ExpansionStore, NavigationController, NavigationTree};
//! use rw_nav_store::NullStore;
//!
//! let tree = NavigationTree::from_yaml(r"
//! - title: Guides
//!   children:
//!     - title: Install
//!       href: /guides/install
//! ")?;
//! let expansion = ExpansionStore::new(Arc::new(NullStore), "quartz-open-sections");
//! let mut sidebar = NavigationController::new(Arc::new(tree), expansion);
//!
//! sidebar.load();
//! sidebar.navigate("/guides/install", Instant::now());
//!
//! let rows = sidebar.render();
//! assert!(rows[0].is_open);
//! assert!(rows[0].children[0].is_active);
//! assert_eq!(sidebar.section_title(), Some("Guides"));
//! # Ok(())
//! # }
//! ```

mod controller;
mod error;
mod expansion;
pub mod matcher;
mod reveal;
mod scroll_spy;
mod toc;
mod tree;
mod viewport;

pub use controller::{
    Hit, NavigationController, NavigationUpdate, RenderedNode, RowKind, RowOutcome, render,
};
pub use error::{NavigationError, TocError};
pub use expansion::{DefaultOpen, ExpansionState, ExpansionStore};
pub use matcher::PathMatch;
pub use reveal::{
    DEFAULT_REVEAL_DELAY, DeferredReveal, RevealOutcome, RevealTarget, ScrollBehavior,
    ScrollBlock, ScrollOptions,
};
pub use scroll_spy::{ActiveHeadingReceiver, DEFAULT_BOTTOM_EPSILON, ScrollSpy};
pub use toc::{TableOfContents, TocEntry, TocRow, TocSection, TocSubsection};
pub use tree::{Href, Iter, NavigationNode, NavigationTree, NodePath};
pub use viewport::{
    ActivationZone, DEFAULT_ACTIVATION_ZONE, DEFAULT_THRESHOLDS, HeadingRect, IntersectionEntry,
    IntersectionSource, ObservationBatch, ObserverOptions, ScrollMetrics, SyntheticPage,
};

// Re-exported so hosts can build an `ExpansionStore` without a direct dependency
pub use rw_nav_store::{KeyValueStore, NullStore};
