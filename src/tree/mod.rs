//! Usage tree - incremental grouping of usages into a sorted hierarchy
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. Every node is one of
//! three kinds (target, group, usage); the root is a group with no key and rule
//! index -1. Parent links are back-references used for walking up only.
//!
//! All edits run on one thread. Producers that search in parallel must funnel
//! their usages through a single owner of the tree.

pub mod dump;
pub mod group;
pub mod node;
pub mod sink;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub(crate) mod testing;

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::usages::usage::{GroupingRule, Usage, UsageGroup};

pub use group::GroupNode;
pub use node::NodeState;
pub use sink::{NullSink, RecordingSink, TracingSink, TreeEvent, TreeSink};

/// Rule index of the root container
pub const ROOT_RULE_INDEX: i32 = -1;

/// Handle of a node inside one [`UsageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pseudo-node standing for one of the searched targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNode {
    pub label: String,
}

/// Leaf wrapping one usage
#[derive(Debug)]
pub struct UsageNode<U> {
    pub(crate) usage: U,
    pub(crate) excluded: bool,
}

impl<U> UsageNode<U> {
    pub fn usage(&self) -> &U {
        &self.usage
    }

    pub fn is_usage_excluded(&self) -> bool {
        self.excluded
    }
}

/// Kind-specific payload of a node
#[derive(Debug)]
pub enum NodeKind<U, G> {
    Target(TargetNode),
    Group(GroupNode<G>),
    Usage(UsageNode<U>),
}

impl<U, G> NodeKind<U, G> {
    /// Display precedence among siblings: targets, then groups, then usages.
    pub fn rank(&self) -> u8 {
        match self {
            NodeKind::Target(_) => 1,
            NodeKind::Group(_) => 2,
            NodeKind::Usage(_) => 3,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node<U, G> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) state: NodeState,
    pub(crate) kind: NodeKind<U, G>,
}

impl<U, G> Node<U, G> {
    fn new(parent: Option<NodeId>, kind: NodeKind<U, G>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            state: NodeState::default(),
            kind,
        }
    }
}

/// Settings that shape how usages are inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSettings {
    /// Merge usages that land on the same line into one node
    pub filter_duplicate_lines: bool,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            filter_duplicate_lines: true,
        }
    }
}

/// The root container and owner of every node.
///
/// Slots of removed nodes are never reused, so a stale [`NodeId`] is always
/// detected; a tree lives for a single search session.
pub struct UsageTree<U, G, S = NullSink> {
    nodes: Vec<Option<Node<U, G>>>,
    root: NodeId,
    rules: Vec<Box<dyn GroupingRule<U, G>>>,
    settings: TreeSettings,
    sink: S,
}

impl<U: Usage, G: UsageGroup, S: TreeSink> UsageTree<U, G, S> {
    /// Create an empty tree grouping usages with `rules`, in order.
    pub fn new(rules: Vec<Box<dyn GroupingRule<U, G>>>, settings: TreeSettings, sink: S) -> Self {
        let root = Node::new(None, NodeKind::Group(GroupNode::new(None, ROOT_RULE_INDEX)));
        Self {
            nodes: vec![Some(root)],
            root: NodeId(0),
            rules,
            settings,
            sink,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn settings(&self) -> TreeSettings {
        self.settings
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Classify `usage` with the rule chain and insert it under the matching groups.
    ///
    /// Returns the node now representing the usage, which is a pre-existing node
    /// when the usage merged into a sibling.
    pub fn append_usage(&mut self, usage: U) -> NodeId {
        let groups: Vec<(i32, G)> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| rule.group_for(&usage).map(|g| (index as i32, g)))
            .collect();

        let mut parent = self.root;
        for (rule_index, group) in groups {
            parent = self.add_group(parent, group, rule_index);
        }
        self.add_usage(parent, usage)
    }

    /// Insert a target pseudo-node under the root.
    ///
    /// Targets keep the order they were added in, ahead of every group and usage.
    pub fn add_target(&mut self, label: impl Into<String>) -> NodeId {
        let root = self.root;
        let id = self.alloc(Node::new(
            Some(root),
            NodeKind::Target(TargetNode {
                label: label.into(),
            }),
        ));
        let index = self
            .node(root)
            .children
            .iter()
            .position(|&child| !matches!(self.node(child).kind, NodeKind::Target(_)))
            .unwrap_or_else(|| self.node(root).children.len());
        self.node_mut(root).children.insert(index, id);
        self.sink.node_inserted(root, id, index);
        id
    }

    /// Total usage nodes below `group`, including nested subgroups.
    pub fn recursive_usage_count(&self, group: NodeId) -> usize {
        self.group(group).recursive_usage_count()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of `id` in display order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind<U, G> {
        &self.node(id).kind
    }

    /// Whether `id` still addresses a node of this tree
    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    /// Group key of a group node (`None` for the root)
    pub fn group_of(&self, id: NodeId) -> Option<&G> {
        self.group(id).group()
    }

    /// Usage wrapped by a usage node
    pub fn usage(&self, id: NodeId) -> &U {
        &self.usage_node(id).usage
    }

    /// Every usage node, in display order (depth first)
    pub fn usage_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if let NodeKind::Usage(_) = node.kind {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Mark a usage node excluded (or not) and refresh it and its ancestors.
    pub fn set_usage_excluded(&mut self, id: NodeId, excluded: bool) {
        self.usage_node_mut(id).excluded = excluded;
        let mut current = Some(id);
        while let Some(node) = current {
            self.update(node);
            current = self.node(node).parent;
        }
    }

    /// Refresh cached flags for every node below and including `id`, children first.
    pub fn update_subtree(&mut self, id: NodeId) {
        let children = self.node(id).children.clone();
        for child in children {
            self.update_subtree(child);
        }
        self.update(id);
    }

    pub fn update_all(&mut self) {
        self.update_subtree(self.root);
    }

    /// Refresh every flag, then remove usage nodes whose usage became invalid.
    ///
    /// Returns the number of removed usage nodes.
    pub fn purge_invalid(&mut self) -> usize {
        self.update_all();
        let invalid: Vec<NodeId> = self
            .usage_nodes()
            .into_iter()
            .filter(|&id| !self.is_valid(id))
            .collect();

        let root = self.root;
        let mut removed = 0;
        for id in invalid {
            if self.remove_usage(root, id) {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "purged invalid usages");
        }
        removed
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<U, G> {
        match self.nodes.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("node {id} is not part of the tree"),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<U, G> {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("node {id} is not part of the tree"),
        }
    }

    pub(crate) fn group(&self, id: NodeId) -> &GroupNode<G> {
        match &self.node(id).kind {
            NodeKind::Group(group) => group,
            _ => panic!("node {id} is not a group"),
        }
    }

    pub(crate) fn group_mut(&mut self, id: NodeId) -> &mut GroupNode<G> {
        match &mut self.node_mut(id).kind {
            NodeKind::Group(group) => group,
            _ => panic!("node {id} is not a group"),
        }
    }

    pub(crate) fn usage_node(&self, id: NodeId) -> &UsageNode<U> {
        match &self.node(id).kind {
            NodeKind::Usage(usage) => usage,
            _ => panic!("node {id} is not a usage"),
        }
    }

    pub(crate) fn usage_node_mut(&mut self, id: NodeId) -> &mut UsageNode<U> {
        match &mut self.node_mut(id).kind {
            NodeKind::Usage(usage) => usage,
            _ => panic!("node {id} is not a usage"),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<U, G>) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    /// Drop `id` and everything below it from the arena.
    pub(crate) fn release(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) {
            for child in node.children {
                self.release(child);
            }
        }
    }
}
