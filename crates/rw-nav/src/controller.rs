//! Sidebar controller: tree + current page + expansion state.
//!
//! [`NavigationController`] combines the static [`NavigationTree`], the path
//! matcher and the [`ExpansionStore`] into a renderable tree of
//! [`RenderedNode`]s, and is the single entry point for user interaction with
//! sidebar rows.
//!
//! A navigation runs in this order:
//!
//! 1. [`navigate`](NavigationController::navigate) matches the new path, forces
//!    its ancestors open, and schedules a deferred reveal of its row.
//! 2. The host renders [`render`](NavigationController::render).
//! 3. Once the delay has passed, [`poll_reveal`](NavigationController::poll_reveal)
//!    scrolls the row into view.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::expansion::{ExpansionState, ExpansionStore};
use crate::matcher::{ancestor_chain, find_match};
use crate::reveal::{DeferredReveal, RevealOutcome, RevealTarget};
use crate::tree::{Href, NavigationNode, NavigationTree, NodePath};

/// Shape of a sidebar row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Plain link (`href`, no children).
    Link,
    /// Link with a separate expand/collapse control (`href` and children).
    LinkWithToggle,
    /// Whole row toggles (no `href`, has children).
    Toggle,
    /// Inert text (no `href`, no children).
    Label,
}

impl RowKind {
    fn of(node: &NavigationNode) -> Self {
        match (node.href.is_some(), node.is_group()) {
            (true, false) => Self::Link,
            (true, true) => Self::LinkWithToggle,
            (false, true) => Self::Toggle,
            (false, false) => Self::Label,
        }
    }
}

/// Sidebar row ready for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedNode {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<Href>,
    #[serde(skip)]
    pub path: NodePath,
    /// Nesting level, 0 for top-level rows.
    pub depth: usize,
    pub kind: RowKind,
    pub is_open: bool,
    /// Whether the row links to the current page.
    pub is_active: bool,
    pub has_children: bool,
    /// Rendered children; empty unless the row is open.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedNode>,
}

/// Render the sidebar for `current_path` using `expansion` for open state.
///
/// Children of collapsed rows are not rendered.
#[must_use]
pub fn render(
    tree: &NavigationTree,
    current_path: Option<&str>,
    expansion: &ExpansionStore,
) -> Vec<RenderedNode> {
    render_level(tree.roots(), &NodePath::root(), current_path, expansion)
}

fn render_level(
    nodes: &[NavigationNode],
    parent: &NodePath,
    current_path: Option<&str>,
    expansion: &ExpansionStore,
) -> Vec<RenderedNode> {
    nodes
        .iter()
        .map(|node| {
            let path = parent.child(node.title.as_str());
            let is_open = expansion.is_open(&path);
            let is_active = match (&node.href, current_path) {
                (Some(href), Some(current)) => href.matches(current),
                _ => false,
            };
            let children = if is_open {
                render_level(&node.children, &path, current_path, expansion)
            } else {
                Vec::new()
            };

            RenderedNode {
                title: node.title.clone(),
                href: node.href.clone(),
                depth: parent.depth(),
                kind: RowKind::of(node),
                is_open,
                is_active,
                has_children: node.is_group(),
                children,
                path,
            }
        })
        .collect()
}

/// Part of a row the user activated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    /// The title text (the link, for rows that have one).
    Title,
    /// The dedicated expand/collapse control.
    Toggle,
}

/// Result of activating a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowOutcome {
    /// Follow the row's link.
    Navigate(Href),
    /// The row was expanded or collapsed.
    Toggled {
        path: NodePath,
        is_open: bool,
    },
    /// The hit has no effect on this row.
    Ignored,
}

/// Effects of [`NavigationController::navigate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationUpdate {
    /// Node path of the row linking to the new page.
    pub matched: Option<NodePath>,
    /// Title of the matched row's parent.
    pub section_title: Option<String>,
    /// Ancestor node paths that were forced open.
    pub forced_open: Vec<NodePath>,
    /// Whether forcing them open changed the expansion state.
    pub changed: bool,
}

/// Sidebar state for one browsing session.
pub struct NavigationController {
    tree: Arc<NavigationTree>,
    expansion: ExpansionStore,
    current_path: Option<String>,
    section_title: Option<String>,
    reveal: DeferredReveal,
}

impl NavigationController {
    /// Create a controller with no current page.
    #[must_use]
    pub fn new(tree: Arc<NavigationTree>, expansion: ExpansionStore) -> Self {
        Self {
            tree,
            expansion,
            current_path: None,
            section_title: None,
            reveal: DeferredReveal::default(),
        }
    }

    /// Use `delay` between forced-open resolution and revealing the row.
    #[must_use]
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal = DeferredReveal::new(delay);
        self
    }

    /// Load the persisted expansion state.
    pub fn load(&mut self) -> &ExpansionState {
        self.expansion.load()
    }

    /// Switch to the page at `path`.
    ///
    /// Forces the ancestors of the matching row open and schedules its reveal
    /// at `now` plus the reveal delay. An untracked page clears the section
    /// title and any pending reveal.
    pub fn navigate(&mut self, path: &str, now: Instant) -> NavigationUpdate {
        self.current_path = Some(path.to_owned());

        let Some(found) = find_match(&self.tree, path) else {
            tracing::debug!(path, "page not in navigation");
            self.section_title = None;
            self.reveal.cancel();
            return NavigationUpdate::default();
        };

        let section_title = found.ancestor_title().map(str::to_owned);
        let forced_open = found.forced_open();
        let matched = found.path;

        let changed = self.expansion.force_open(&forced_open);
        tracing::debug!(
            path,
            node = %matched,
            forced = forced_open.len(),
            changed,
            "resolved current page"
        );
        self.reveal.schedule(matched.clone(), now);
        self.section_title.clone_from(&section_title);

        NavigationUpdate {
            matched: Some(matched),
            section_title,
            forced_open,
            changed,
        }
    }

    /// Render the sidebar for the current page.
    #[must_use]
    pub fn render(&self) -> Vec<RenderedNode> {
        render(&self.tree, self.current_path.as_deref(), &self.expansion)
    }

    /// Flip the row at `path`.
    ///
    /// Returns the new open state, or `None` when `path` does not name a row
    /// with children.
    pub fn toggle(&mut self, path: &NodePath) -> Option<bool> {
        if !self.tree.get(path).is_some_and(NavigationNode::is_group) {
            return None;
        }
        Some(self.expansion.toggle(path))
    }

    /// Expand every row in `paths`.
    pub fn open(&mut self, paths: &[NodePath]) -> bool {
        self.expansion.force_open(paths)
    }

    /// Handle a click on part of the row at `path`.
    ///
    /// A toggle hit never navigates, even on a row that also links somewhere.
    pub fn activate(&mut self, path: &NodePath, hit: Hit) -> RowOutcome {
        let Some(node) = self.tree.get(path) else {
            return RowOutcome::Ignored;
        };

        match (RowKind::of(node), hit) {
            (RowKind::Link | RowKind::LinkWithToggle, Hit::Title) => match &node.href {
                Some(href) => RowOutcome::Navigate(href.clone()),
                None => RowOutcome::Ignored,
            },
            (RowKind::Toggle, _) | (RowKind::LinkWithToggle, Hit::Toggle) => {
                let is_open = self.expansion.toggle(path);
                RowOutcome::Toggled {
                    path: path.clone(),
                    is_open,
                }
            }
            (RowKind::Link | RowKind::Label, _) => RowOutcome::Ignored,
        }
    }

    /// Perform the pending reveal if it is due.
    pub fn poll_reveal(&mut self, now: Instant, target: &mut dyn RevealTarget) -> RevealOutcome {
        self.reveal.poll(now, target)
    }

    /// Node path of the row waiting to be revealed.
    #[must_use]
    pub fn pending_reveal(&self) -> Option<&NodePath> {
        self.reveal.pending()
    }

    /// Title shown above the page heading.
    #[must_use]
    pub fn section_title(&self) -> Option<&str> {
        self.section_title.as_deref()
    }

    /// Ancestors of the current page's row, root first.
    #[must_use]
    pub fn breadcrumbs(&self) -> Vec<&NavigationNode> {
        self.current_path
            .as_deref()
            .map(|path| ancestor_chain(&self.tree, path))
            .unwrap_or_default()
    }

    /// The page most recently passed to [`navigate`](Self::navigate).
    #[must_use]
    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    #[must_use]
    pub fn tree(&self) -> &NavigationTree {
        &self.tree
    }

    #[must_use]
    pub fn expansion(&self) -> &ExpansionStore {
        &self.expansion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::DefaultOpen;
    use crate::reveal::ScrollOptions;
    use pretty_assertions::assert_eq;
    use rw_nav_store::{KeyValueStore, MemoryStore};

    const NS: &str = "quartz-open-sections";

    static_assertions::assert_impl_all!(super::NavigationController: Send, Sync);

    fn tree() -> Arc<NavigationTree> {
        Arc::new(
            NavigationTree::new(vec![
                NavigationNode::group(
                    "Introduction",
                    vec![NavigationNode::leaf("Getting started", "/#quickstart")],
                ),
                NavigationNode::group(
                    "Quartz Core",
                    vec![
                        NavigationNode::leaf("Dependency Injection", "/docs/core/di"),
                        NavigationNode::group(
                            "Tasks",
                            vec![NavigationNode::leaf("Repeated Tasks", "/docs/core/repeated")],
                        )
                        .with_href("/docs/core/tasks"),
                    ],
                ),
                NavigationNode::leaf("GitHub", "https://github.com/example/quartz"),
                NavigationNode {
                    title: "Coming soon".to_owned(),
                    href: None,
                    children: Vec::new(),
                },
            ])
            .unwrap(),
        )
    }

    fn controller(store: &Arc<MemoryStore>) -> NavigationController {
        let expansion = ExpansionStore::new(Arc::clone(store) as Arc<dyn KeyValueStore>, NS);
        NavigationController::new(tree(), expansion)
    }

    fn path(titles: &[&str]) -> NodePath {
        NodePath::from_titles(titles.iter().copied())
    }

    fn titles(rows: &[RenderedNode]) -> Vec<&str> {
        rows.iter().map(|r| r.title.as_str()).collect()
    }

    struct Sidebar {
        rendered: Vec<NodePath>,
        revealed: Vec<NodePath>,
    }

    impl RevealTarget for Sidebar {
        fn scroll_into_view(&mut self, path: &NodePath, _options: ScrollOptions) -> bool {
            if self.rendered.contains(path) {
                self.revealed.push(path.clone());
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn test_row_kinds() {
        let store = Arc::new(MemoryStore::new());
        let rows = controller(&store).render();

        let kinds: Vec<_> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RowKind::Toggle, RowKind::Toggle, RowKind::Link, RowKind::Label]
        );
    }

    #[test]
    fn test_collapsed_rows_hide_children() {
        let store = Arc::new(MemoryStore::new());
        let rows = controller(&store).render();

        assert!(rows.iter().all(|r| !r.is_open && r.children.is_empty()));
        assert!(rows[0].has_children);
    }

    #[test]
    fn test_default_open_applies_without_entry() {
        let store = Arc::new(MemoryStore::new());
        let expansion = ExpansionStore::new(store, NS)
            .with_default_open(DefaultOpen::new(["Introduction"]));
        let controller = NavigationController::new(tree(), expansion);

        let rows = controller.render();

        assert!(rows[0].is_open);
        assert_eq!(titles(&rows[0].children), vec!["Getting started"]);
        assert_eq!(rows[0].children[0].depth, 1);
        assert!(!rows[1].is_open);
    }

    #[test]
    fn test_navigate_forces_ancestors_open_and_marks_active() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store);

        let update = controller.navigate("/docs/core/repeated", Instant::now());

        assert_eq!(update.section_title.as_deref(), Some("Tasks"));
        assert_eq!(update.forced_open, vec![path(&["Quartz Core"]), path(&["Quartz Core", "Tasks"])]);
        assert!(update.changed);
        assert_eq!(controller.section_title(), Some("Tasks"));

        let rows = controller.render();
        let core = &rows[1];
        assert!(core.is_open);
        let tasks = &core.children[1];
        assert_eq!(tasks.kind, RowKind::LinkWithToggle);
        assert!(tasks.is_open);
        assert!(!tasks.is_active);
        assert!(tasks.children[0].is_active);
        assert_eq!(tasks.children[0].depth, 2);
    }

    #[test]
    fn test_navigate_untracked_page() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store);
        controller.navigate("/docs/core/di", Instant::now());

        let update = controller.navigate("/blog", Instant::now());

        assert_eq!(update, NavigationUpdate::default());
        assert_eq!(controller.section_title(), None);
        assert!(controller.pending_reveal().is_none());
        assert!(controller.breadcrumbs().is_empty());
    }

    #[test]
    fn test_external_link_is_never_active() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store);

        controller.navigate("https://github.com/example/quartz", Instant::now());

        assert!(controller.render().iter().all(|r| !r.is_active));
    }

    #[test]
    fn test_breadcrumbs_follow_current_page() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store);

        controller.navigate("/docs/core/repeated", Instant::now());

        let crumbs: Vec<_> = controller.breadcrumbs().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(crumbs, vec!["Quartz Core", "Tasks"]);
    }

    #[test]
    fn test_toggle_hit_on_link_row_does_not_navigate() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store);
        controller.open(&[path(&["Quartz Core"])]);
        let tasks = path(&["Quartz Core", "Tasks"]);

        let outcome = controller.activate(&tasks, Hit::Toggle);

        assert_eq!(
            outcome,
            RowOutcome::Toggled {
                path: tasks.clone(),
                is_open: true
            }
        );
        assert_eq!(
            controller.activate(&tasks, Hit::Title),
            RowOutcome::Navigate(Href::parse("/docs/core/tasks"))
        );
        assert!(controller.expansion().is_open(&tasks));
    }

    #[test]
    fn test_title_hit_on_toggle_row_toggles() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store);
        let intro = path(&["Introduction"]);

        assert_eq!(
            controller.activate(&intro, Hit::Title),
            RowOutcome::Toggled {
                path: intro.clone(),
                is_open: true
            }
        );
        assert_eq!(
            controller.activate(&intro, Hit::Toggle),
            RowOutcome::Toggled {
                path: intro,
                is_open: false
            }
        );
    }

    #[test]
    fn test_inert_hits_are_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store);

        assert_eq!(controller.activate(&path(&["GitHub"]), Hit::Toggle), RowOutcome::Ignored);
        assert_eq!(controller.activate(&path(&["Coming soon"]), Hit::Title), RowOutcome::Ignored);
        assert_eq!(controller.activate(&path(&["Nope"]), Hit::Title), RowOutcome::Ignored);
    }

    #[test]
    fn test_toggle_rejects_leaves_and_unknown_paths() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store);

        assert_eq!(controller.toggle(&path(&["GitHub"])), None);
        assert_eq!(controller.toggle(&path(&["Nope"])), None);
        assert_eq!(controller.toggle(&path(&["Introduction"])), Some(true));
    }

    #[test]
    fn test_reveal_fires_after_delay() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store).with_reveal_delay(Duration::from_millis(100));
        let start = Instant::now();
        let repeated = path(&["Quartz Core", "Tasks", "Repeated Tasks"]);
        let mut sidebar = Sidebar {
            rendered: vec![repeated.clone()],
            revealed: Vec::new(),
        };

        controller.navigate("/docs/core/repeated", start);

        assert_eq!(controller.poll_reveal(start, &mut sidebar), RevealOutcome::Pending);
        assert_eq!(
            controller.poll_reveal(start + Duration::from_millis(100), &mut sidebar),
            RevealOutcome::Revealed(repeated.clone())
        );
        assert_eq!(sidebar.revealed, vec![repeated]);
    }

    #[test]
    fn test_reveal_of_removed_row_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let mut controller = controller(&store).with_reveal_delay(Duration::ZERO);
        let now = Instant::now();
        let mut sidebar = Sidebar {
            rendered: Vec::new(),
            revealed: Vec::new(),
        };

        controller.navigate("/docs/core/di", now);

        assert!(matches!(
            controller.poll_reveal(now, &mut sidebar),
            RevealOutcome::Missing(_)
        ));
        assert!(sidebar.revealed.is_empty());
    }

    #[test]
    fn test_forced_open_survives_load() {
        let store = Arc::new(MemoryStore::new().with_entry(NS, r#"{"/Quartz Core":false}"#));
        let mut controller = controller(&store);

        controller.navigate("/docs/core/di", Instant::now());
        controller.load();

        assert!(controller.render()[1].is_open);
        assert_eq!(store.raw(NS), Some(r#"{"/Quartz Core":true}"#.to_owned()));
    }
}
