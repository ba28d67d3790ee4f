//! Matching the current page path against the navigation tree.
//!
//! A single depth-first, left-to-right search finds the node whose internal
//! href equals the current path. From that match we derive:
//!
//! - the section title shown above the page (the matched node's parent title)
//! - the breadcrumb chain (every ancestor, root first)
//! - the forced-open set (node paths of every ancestor, so the page is visible)
//!
//! The first match wins. [`NavigationTree`] rejects duplicate internal hrefs,
//! so for validated trees the match is unique anyway.

use crate::tree::{NavigationNode, NavigationTree, NodePath};

/// A node matched by [`find_match`] together with its ancestry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathMatch<'a> {
    /// The node whose href equals the current path.
    pub node: &'a NavigationNode,
    /// Node path of the matched node.
    pub path: NodePath,
    /// Ancestors of the matched node, root first. Excludes the node itself.
    pub ancestors: Vec<&'a NavigationNode>,
}

impl<'a> PathMatch<'a> {
    /// Title of the matched node's direct parent.
    ///
    /// `None` when the matched node is top-level.
    #[must_use]
    pub fn ancestor_title(&self) -> Option<&'a str> {
        self.ancestors.last().map(|node| node.title.as_str())
    }

    /// Node paths that must be expanded for the matched node to be visible.
    ///
    /// Root first; excludes the matched node's own path.
    #[must_use]
    pub fn forced_open(&self) -> Vec<NodePath> {
        self.path.ancestors()
    }
}

/// Find the first node (depth-first, left-to-right) linking to `current_path`.
///
/// Comparison is strict string equality: no trailing-slash or query
/// normalization. External links never match.
#[must_use]
pub fn find_match<'a>(tree: &'a NavigationTree, current_path: &str) -> Option<PathMatch<'a>> {
    let mut ancestors = Vec::new();
    search(tree.roots(), &NodePath::root(), current_path, &mut ancestors)
}

fn search<'a>(
    nodes: &'a [NavigationNode],
    parent: &NodePath,
    current_path: &str,
    ancestors: &mut Vec<&'a NavigationNode>,
) -> Option<PathMatch<'a>> {
    for node in nodes {
        let path = parent.child(node.title.as_str());
        if node.href.as_ref().is_some_and(|href| href.matches(current_path)) {
            return Some(PathMatch {
                node,
                path,
                ancestors: ancestors.clone(),
            });
        }

        ancestors.push(node);
        let found = search(&node.children, &path, current_path, ancestors);
        ancestors.pop();
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Title of the parent of the node linking to `current_path`.
///
/// Used as the section title above the page heading. Returns `None` when the
/// page is not in the tree or sits at the top level.
#[must_use]
pub fn find_ancestor_title<'a>(tree: &'a NavigationTree, current_path: &str) -> Option<&'a str> {
    find_match(tree, current_path).and_then(|m| m.ancestor_title())
}

/// Node paths of every ancestor of the node linking to `current_path`.
///
/// Empty when the page is not in the tree.
#[must_use]
pub fn find_forced_open_paths(tree: &NavigationTree, current_path: &str) -> Vec<NodePath> {
    find_match(tree, current_path)
        .map(|m| m.forced_open())
        .unwrap_or_default()
}

/// Ancestor nodes of the node linking to `current_path`, root first.
///
/// Empty when the page is not in the tree or sits at the top level.
#[must_use]
pub fn ancestor_chain<'a>(tree: &'a NavigationTree, current_path: &str) -> Vec<&'a NavigationNode> {
    find_match(tree, current_path)
        .map(|m| m.ancestors)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(paths: &[NodePath]) -> Vec<&str> {
        paths.iter().map(NodePath::key).collect()
    }

    fn docs_tree() -> NavigationTree {
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
            )
            .with_href("/docs/core"),
            NavigationNode::leaf("Changelog", "/changelog"),
            NavigationNode::leaf("GitHub", "https://github.com/example/quartz"),
        ])
        .unwrap()
    }

    #[test]
    fn test_ancestor_title_is_direct_parent() {
        let tree = docs_tree();

        assert_eq!(find_ancestor_title(&tree, "/docs/core/di"), Some("Quartz Core"));
        assert_eq!(find_ancestor_title(&tree, "/docs/core/repeated"), Some("Tasks"));
        assert_eq!(find_ancestor_title(&tree, "/#quickstart"), Some("Introduction"));
    }

    #[test]
    fn test_ancestor_title_of_group_that_is_a_page() {
        let tree = docs_tree();

        assert_eq!(find_ancestor_title(&tree, "/docs/core/tasks"), Some("Quartz Core"));
    }

    #[test]
    fn test_top_level_match_has_no_ancestor_title() {
        let tree = docs_tree();

        assert_eq!(find_ancestor_title(&tree, "/changelog"), None);
        assert_eq!(find_ancestor_title(&tree, "/docs/core"), None);
        assert!(find_forced_open_paths(&tree, "/changelog").is_empty());
        assert!(find_match(&tree, "/changelog").is_some());
    }

    #[test]
    fn test_forced_open_paths_are_ancestors_only() {
        let tree = docs_tree();

        assert_eq!(
            keys(&find_forced_open_paths(&tree, "/docs/core/repeated")),
            vec!["/Quartz Core", "/Quartz Core/Tasks"]
        );
    }

    #[test]
    fn test_unknown_path_yields_nothing() {
        let tree = docs_tree();

        assert_eq!(find_ancestor_title(&tree, "/nope"), None);
        assert!(find_forced_open_paths(&tree, "/nope").is_empty());
        assert!(ancestor_chain(&tree, "/nope").is_empty());
        assert!(find_match(&tree, "/nope").is_none());
    }

    #[test]
    fn test_no_trailing_slash_normalization() {
        let tree = docs_tree();

        assert!(find_match(&tree, "/docs/core/").is_none());
    }

    #[test]
    fn test_external_links_never_match() {
        let tree = docs_tree();

        assert!(find_match(&tree, "https://github.com/example/quartz").is_none());
    }

    #[test]
    fn test_ancestor_chain_root_first() {
        let tree = docs_tree();

        let titles: Vec<_> = ancestor_chain(&tree, "/docs/core/repeated")
            .iter()
            .map(|n| n.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Quartz Core", "Tasks"]);
    }

    #[test]
    fn test_match_carries_node_and_path() {
        let tree = docs_tree();

        let found = find_match(&tree, "/docs/core/repeated").unwrap();
        assert_eq!(found.node.title, "Repeated Tasks");
        assert_eq!(found.path.key(), "/Quartz Core/Tasks/Repeated Tasks");
    }

    #[test]
    fn test_every_leaf_matches_its_parent() {
        let tree = docs_tree();

        for (path, node) in &tree {
            let Some(href) = node.href.as_ref().filter(|h| !h.is_external()) else {
                continue;
            };
            let found = find_match(&tree, href.as_str()).unwrap();
            assert_eq!(found.path, path);
            assert_eq!(found.forced_open(), path.ancestors());
            let parent_title = path.segments().iter().rev().nth(1).map(String::as_str);
            assert_eq!(found.ancestor_title(), parent_title);
        }
    }
}
