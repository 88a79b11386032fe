use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::warn;

use super::StyleHost;

static COMPOUND_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\.[A-Za-z_][A-Za-z0-9_-]*)+$").expect("valid class pattern"));

/// Handle into a [`MemoryHost`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    styles: BTreeMap<String, String>,
}

/// In-memory element tree with inline styles.
///
/// Serves headless rendering and tests; mirrors the small slice of a DOM the
/// engine needs.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<Node>,
    style_writes: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Create an element with the given classes and append it to `parent`
    pub fn append(&mut self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let child = self.create_element(tag);
        for class in classes {
            self.add_class(child, class);
        }
        self.append_child(parent, child);
        child
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.nodes[old_parent.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        let classes = &mut self.nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    /// Inline style value currently set on `node`
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes[node.0].styles.get(property).map(String::as_str)
    }

    pub fn styles(&self, node: NodeId) -> &BTreeMap<String, String> {
        &self.nodes[node.0].styles
    }

    /// Number of `set_style` calls received so far
    pub fn style_writes(&self) -> usize {
        self.style_writes
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            found.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        found
    }

    fn matches_compound(&self, node: NodeId, compound: &str) -> bool {
        compound
            .split('.')
            .filter(|class| !class.is_empty())
            .all(|class| self.has_class(node, class))
    }

    /// Whether some ancestor of `node` below `root` matches `compound`
    fn has_ancestor_matching(&self, node: NodeId, root: NodeId, compounds: &[&str]) -> bool {
        let Some((last, rest)) = compounds.split_last() else {
            return true;
        };
        let mut current = self.nodes[node.0].parent;
        while let Some(ancestor) = current {
            if ancestor == root {
                return false;
            }
            if self.matches_compound(ancestor, last) && self.has_ancestor_matching(ancestor, root, rest) {
                return true;
            }
            current = self.nodes[ancestor.0].parent;
        }
        false
    }
}

impl StyleHost for MemoryHost {
    type Element = NodeId;

    fn query_all(&self, root: &NodeId, selector: &str) -> Vec<NodeId> {
        let compounds: Vec<&str> = selector.split_whitespace().collect();
        if compounds.is_empty() || !compounds.iter().all(|c| COMPOUND_CLASS.is_match(c)) {
            warn!("⚠️  Unsupported object selector '{}'", selector);
            return Vec::new();
        }

        let Some((target, ancestors)) = compounds.split_last() else {
            return Vec::new();
        };
        self.descendants(*root)
            .into_iter()
            .filter(|node| self.matches_compound(*node, target))
            .filter(|node| self.has_ancestor_matching(*node, *root, ancestors))
            .collect()
    }

    fn set_style(&mut self, element: &NodeId, property: &str, value: &str) {
        self.style_writes += 1;
        self.nodes[element.0]
            .styles
            .insert(property.to_string(), value.to_string());
    }

    fn remove_style(&mut self, element: &NodeId, property: &str) {
        self.nodes[element.0].styles.remove(property);
    }
}
