//! Static navigation tree.
//!
//! The sidebar is described by an immutable tree of [`NavigationNode`]s. A
//! node with children is a group; a node without children is a leaf. Either
//! kind may carry an [`Href`], so a group can also be a page of its own.
//!
//! Node identity for expansion state is the [`NodePath`]: the titles from the
//! root down to the node, each prefixed with `/`. Titles only need to be
//! unique among siblings; the full path disambiguates equal titles living in
//! different branches.
//!
//! # Example
//!
//! ```
//! use rw_nav::NavigationTree;
//!
//! let tree = NavigationTree::from_yaml(r"
//! - title: Guides
//!   children:
//!     - title: Install
//!       href: /guides/install
//! ").unwrap();
//!
//! assert_eq!(tree.roots()[0].children[0].title, "Install");
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::NavigationError;

/// Link target of a navigation node.
///
/// Internal targets are site paths compared against the current page path by
/// strict string equality. External targets (anything with a URL scheme,
/// protocol-relative URLs, `mailto:` links) are rendered the same way but
/// never count as the current page.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Href {
    /// Path within the documentation site (e.g. `/docs/core`, `/#quickstart`).
    Internal(String),
    /// Fully external URL.
    External(String),
}

impl Href {
    /// Classify a raw link target.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if is_external(raw) {
            Self::External(raw.to_owned())
        } else {
            Self::Internal(raw.to_owned())
        }
    }

    /// Raw link target.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Internal(s) | Self::External(s) => s,
        }
    }

    /// Whether the target leaves the site.
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }

    /// Whether this target is the page at `current_path`.
    ///
    /// External targets never match.
    #[must_use]
    pub fn matches(&self, current_path: &str) -> bool {
        match self {
            Self::Internal(path) => path == current_path,
            Self::External(_) => false,
        }
    }
}

fn is_external(raw: &str) -> bool {
    if raw.starts_with("//") || raw.starts_with("mailto:") {
        return true;
    }
    // scheme://... where scheme is ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
    raw.split_once("://").is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

impl From<String> for Href {
    fn from(raw: String) -> Self {
        if is_external(&raw) {
            Self::External(raw)
        } else {
            Self::Internal(raw)
        }
    }
}

impl From<Href> for String {
    fn from(href: Href) -> Self {
        match href {
            Href::Internal(s) | Href::External(s) => s,
        }
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation node with optional link and children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationNode {
    /// Display title. Unique among siblings.
    pub title: String,
    /// Link target, if the node is itself a page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<Href>,
    /// Child nodes, in display order.
    #[serde(default, alias = "links", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavigationNode>,
}

impl NavigationNode {
    /// Create a leaf linking to `href`.
    #[must_use]
    pub fn leaf(title: impl Into<String>, href: &str) -> Self {
        Self {
            title: title.into(),
            href: Some(Href::parse(href)),
            children: Vec::new(),
        }
    }

    /// Create a group without a link of its own.
    #[must_use]
    pub fn group(title: impl Into<String>, children: Vec<NavigationNode>) -> Self {
        Self {
            title: title.into(),
            href: None,
            children,
        }
    }

    /// Attach a link target to this node.
    #[must_use]
    pub fn with_href(mut self, href: &str) -> Self {
        self.href = Some(Href::parse(href));
        self
    }

    /// Whether the node has at least one child.
    #[must_use]
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Identity of a node for expansion state: its root-to-node title chain.
///
/// The string key is every title prefixed with `/`, e.g. `/Guides/Install`.
/// The root path (no segments) has the empty key and never names a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath {
    key: String,
    segments: Vec<String>,
}

impl NodePath {
    /// Path above the top-level nodes.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from its titles, root first.
    #[must_use]
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        titles
            .into_iter()
            .fold(Self::root(), |path, title| path.child(title))
    }

    /// Path of the child titled `title`.
    #[must_use]
    pub fn child(&self, title: impl Into<String>) -> Self {
        let title = title.into();
        let mut key = String::with_capacity(self.key.len() + 1 + title.len());
        key.push_str(&self.key);
        key.push('/');
        key.push_str(&title);

        let mut segments = self.segments.clone();
        segments.push(title);
        Self { key, segments }
    }

    /// String key used in the persisted expansion state.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Title of the node this path points at.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Titles from the root down to this node.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of titles in the path (1 for top-level nodes).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Paths of every proper ancestor node, root first.
    ///
    /// For `/A/B/C` this is `[/A, /A/B]`.
    #[must_use]
    pub fn ancestors(&self) -> Vec<NodePath> {
        let mut result = Vec::with_capacity(self.depth().saturating_sub(1));
        let mut current = Self::root();
        for title in self.segments.iter().take(self.depth().saturating_sub(1)) {
            current = current.child(title.as_str());
            result.push(current.clone());
        }
        result
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Validated, immutable navigation tree.
///
/// Construction rejects empty titles, duplicate titles among siblings,
/// node paths whose keys collide (a title containing `/` can spell out
/// another branch), and duplicate internal hrefs. Every node therefore has
/// a distinct [`NodePath`] key and every internal page appears at most once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationTree {
    roots: Vec<NavigationNode>,
}

impl NavigationTree {
    /// Build a tree from its top-level nodes.
    pub fn new(roots: Vec<NavigationNode>) -> Result<Self, NavigationError> {
        validate(&roots)?;
        Ok(Self { roots })
    }

    /// Parse a YAML sequence of nodes.
    pub fn from_yaml(source: &str) -> Result<Self, NavigationError> {
        let roots: Vec<NavigationNode> = serde_yaml::from_str(source)?;
        Self::new(roots)
    }

    /// Parse a JSON array of nodes.
    pub fn from_json(source: &str) -> Result<Self, NavigationError> {
        let roots: Vec<NavigationNode> = serde_json::from_str(source)?;
        Self::new(roots)
    }

    /// Load a tree from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, NavigationError> {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let content = std::fs::read_to_string(path).map_err(|source| NavigationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let tree = match format.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml(&content)?,
            Some("json") => Self::from_json(&content)?,
            _ => return Err(NavigationError::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), nodes = tree.len(), "loaded navigation tree");
        Ok(tree)
    }

    /// Top-level nodes.
    #[must_use]
    pub fn roots(&self) -> &[NavigationNode] {
        &self.roots
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first, pre-order iterator over `(path, node)` pairs.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self
                .roots
                .iter()
                .rev()
                .map(|node| (NodePath::root(), node))
                .collect(),
        }
    }

    /// Find the node at `path`.
    #[must_use]
    pub fn get(&self, path: &NodePath) -> Option<&NavigationNode> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self.roots.iter().find(|n| &n.title == first)?;
        for title in rest {
            node = node.children.iter().find(|n| &n.title == title)?;
        }
        Some(node)
    }
}

/// Iterator returned by [`NavigationTree::iter`].
pub struct Iter<'a> {
    stack: Vec<(NodePath, &'a NavigationNode)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (NodePath, &'a NavigationNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (parent, node) = self.stack.pop()?;
        let path = parent.child(node.title.as_str());
        for child in node.children.iter().rev() {
            self.stack.push((path.clone(), child));
        }
        Some((path, node))
    }
}

impl<'a> IntoIterator for &'a NavigationTree {
    type Item = (NodePath, &'a NavigationNode);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn validate(roots: &[NavigationNode]) -> Result<(), NavigationError> {
    fn visit<'a>(
        nodes: &'a [NavigationNode],
        parent: &NodePath,
        hrefs: &mut HashMap<&'a str, NodePath>,
        keys: &mut HashSet<String>,
    ) -> Result<(), NavigationError> {
        let mut titles = HashSet::new();
        for node in nodes {
            if node.title.is_empty() {
                return Err(NavigationError::EmptyTitle {
                    parent: parent.key().to_owned(),
                });
            }
            if !titles.insert(node.title.as_str()) {
                return Err(NavigationError::DuplicateTitle {
                    parent: parent.key().to_owned(),
                    title: node.title.clone(),
                });
            }

            let path = parent.child(node.title.as_str());
            if !keys.insert(path.key().to_owned()) {
                return Err(NavigationError::DuplicatePath {
                    path: path.key().to_owned(),
                });
            }
            if let Some(Href::Internal(href)) = &node.href {
                if let Some(first) = hrefs.get(href.as_str()) {
                    return Err(NavigationError::DuplicateHref {
                        href: href.clone(),
                        first: first.key().to_owned(),
                        second: path.key().to_owned(),
                    });
                }
                hrefs.insert(href.as_str(), path.clone());
            }

            visit(&node.children, &path, hrefs, keys)?;
        }
        Ok(())
    }

    visit(roots, &NodePath::root(), &mut HashMap::new(), &mut HashSet::new())
}
