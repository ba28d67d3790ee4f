//! Expanded/collapsed state of sidebar nodes.
//!
//! [`ExpansionStore`] owns the mapping from node path key to an `expanded`
//! flag and mirrors it into a [`KeyValueStore`] under a fixed namespace key.
//! The persisted value is a JSON object: `{"/Guides": true, "/Guides/API": false}`.
//!
//! # Load ordering
//!
//! The persisted state is read once by [`ExpansionStore::load`], which the
//! host calls after its first render. Mutations made before that (typically
//! forced-open resolution for the initial page) are applied immediately for
//! rendering, remembered, and replayed on top of the loaded state, so loading
//! never clobbers them and they never clobber the stored state. A toggle is
//! remembered as the value the reader chose, not as a flip: clicking a node
//! open before load leaves it open even if the stored state already had it
//! open. Nothing is
//! written before the load completes. After loading, every mutation that
//! changes the state is written through, including a state where every node is
//! collapsed.
//!
//! Store failures never reach the caller: a failed or corrupt read yields the
//! empty state, and a failed write keeps the state in memory only.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use rw_nav_store::{KeyValueStore, KeyValueStoreExt};

use crate::tree::NodePath;

/// Persisted expansion flags keyed by node path key.
pub type ExpansionState = BTreeMap<String, bool>;

/// Titles of nodes that are open when no explicit entry exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultOpen {
    titles: HashSet<String>,
}

impl DefaultOpen {
    /// Create a default-open set from titles.
    #[must_use]
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a node titled `title` starts open.
    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }
}

/// Mutation recorded before the persisted state was loaded.
#[derive(Clone, Debug)]
enum Mutation {
    Set(NodePath, bool),
    ForceOpen(Vec<NodePath>),
}

/// Component-owned expansion state with a swappable persisted store.
pub struct ExpansionStore {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    default_open: DefaultOpen,
    state: ExpansionState,
    loaded: bool,
    pending: Vec<Mutation>,
}

impl ExpansionStore {
    /// Create an unloaded store persisting under `namespace`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            default_open: DefaultOpen::default(),
            state: ExpansionState::new(),
            loaded: false,
            pending: Vec::new(),
        }
    }

    /// Set the titles that are open when no explicit entry exists.
    #[must_use]
    pub fn with_default_open(mut self, default_open: DefaultOpen) -> Self {
        self.default_open = default_open;
        self
    }

    /// Read the persisted state, replaying any mutations made before.
    ///
    /// Only the first call reads the store; later calls return the current
    /// state unchanged.
    pub fn load(&mut self) -> &ExpansionState {
        if self.loaded {
            return &self.state;
        }

        self.state = read_state(self.store.as_ref(), &self.namespace);
        self.loaded = true;

        let pending = std::mem::take(&mut self.pending);
        let mut changed = false;
        for mutation in &pending {
            changed |= self.apply(mutation);
        }
        tracing::debug!(
            entries = self.state.len(),
            replayed = pending.len(),
            "loaded expansion state"
        );
        if changed {
            self.persist();
        }

        &self.state
    }

    /// Whether [`load`](Self::load) has completed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Explicit entries, without defaults applied.
    #[must_use]
    pub fn state(&self) -> &ExpansionState {
        &self.state
    }

    /// Whether the node at `path` is expanded.
    ///
    /// An explicit entry wins; otherwise the node is open iff its title is in
    /// the default-open set.
    #[must_use]
    pub fn is_open(&self, path: &NodePath) -> bool {
        self.state
            .get(path.key())
            .copied()
            .unwrap_or_else(|| path.title().is_some_and(|t| self.default_open.contains(t)))
    }

    /// Flip the node at `path` and return its new state.
    ///
    /// A node without an entry counts as closed unless its title is
    /// default-open, so the first toggle of an unseen node opens it.
    pub fn toggle(&mut self, path: &NodePath) -> bool {
        let open = !self.is_open(path);
        self.mutate(Mutation::Set(path.clone(), open));
        open
    }

    /// Expand every node in `paths`, leaving all other entries untouched.
    ///
    /// Returns `true` if any entry changed.
    pub fn force_open(&mut self, paths: &[NodePath]) -> bool {
        if paths.is_empty() {
            return false;
        }
        self.mutate(Mutation::ForceOpen(paths.to_vec()))
    }

    /// Forget every entry and remove the persisted value.
    pub fn reset(&mut self) {
        self.state.clear();
        self.pending.clear();
        if let Err(e) = self.store.remove(&self.namespace) {
            tracing::warn!(namespace = %self.namespace, "failed to clear expansion state: {e}");
        }
    }

    fn mutate(&mut self, mutation: Mutation) -> bool {
        let changed = self.apply(&mutation);
        if self.loaded {
            if changed {
                self.persist();
            }
        } else {
            self.pending.push(mutation);
        }
        changed
    }

    fn apply(&mut self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::Set(path, open) => {
                let previous = self.state.insert(path.key().to_owned(), *open);
                previous != Some(*open)
            }
            Mutation::ForceOpen(paths) => {
                let mut changed = false;
                for path in paths {
                    let previous = self.state.insert(path.key().to_owned(), true);
                    changed |= previous != Some(true);
                }
                changed
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.set_json(&self.namespace, &self.state) {
            tracing::warn!(namespace = %self.namespace, "failed to persist expansion state: {e}");
        }
    }
}

/// Read the persisted state, falling back to empty on any failure.
fn read_state(store: &dyn KeyValueStore, namespace: &str) -> ExpansionState {
    match store.get_json::<ExpansionState>(namespace) {
        Ok(Some(state)) => state,
        Ok(None) => ExpansionState::new(),
        Err(e) => {
            tracing::warn!(namespace, "ignoring unreadable expansion state: {e}");
            ExpansionState::new()
        }
    }
}
