//! Group nodes: subgroup lookup, sorted insertion, merge-on-insert, removal
//! with pruning, and recursive usage counts.

use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::tree::sink::TreeSink;
use crate::tree::{Node, NodeId, NodeKind, UsageNode, UsageTree};
use crate::usages::usage::{Usage, UsageGroup};

/// Internal node keyed by a usage group
#[derive(Debug)]
pub struct GroupNode<G> {
    group: Option<G>,
    rule_index: i32,
    subgroups: HashMap<G, NodeId>,
    usages: Vec<NodeId>,
    recursive_usage_count: usize,
}

impl<G: UsageGroup> GroupNode<G> {
    pub(crate) fn new(group: Option<G>, rule_index: i32) -> Self {
        Self {
            group,
            rule_index,
            subgroups: HashMap::new(),
            usages: Vec::new(),
            recursive_usage_count: 0,
        }
    }

    /// Group key, `None` for the root container
    pub fn group(&self) -> Option<&G> {
        self.group.as_ref()
    }

    pub fn rule_index(&self) -> i32 {
        self.rule_index
    }

    pub fn recursive_usage_count(&self) -> usize {
        self.recursive_usage_count
    }

    /// Child group node registered for `group`
    pub fn subgroup(&self, group: &G) -> Option<NodeId> {
        self.subgroups.get(group).copied()
    }

    pub fn subgroup_count(&self) -> usize {
        self.subgroups.len()
    }

    /// Direct usage children, in insertion order
    pub fn usages(&self) -> &[NodeId] {
        &self.usages
    }

    /// Sibling order between groups: rule index first, then the group's own order.
    fn compare(&self, other: &Self) -> Ordering {
        self.rule_index
            .cmp(&other.rule_index)
            .then_with(|| self.group.cmp(&other.group))
    }
}

/// Display order between two sibling nodes.
///
/// Targets come first, then groups, then usages. Groups are ordered among
/// themselves; any other same-kind pair is equal and keeps insertion order.
pub fn compare_nodes<U, G: UsageGroup>(a: &NodeKind<U, G>, b: &NodeKind<U, G>) -> Ordering {
    match (a, b) {
        (NodeKind::Group(a), NodeKind::Group(b)) => a.compare(b),
        _ => a.rank().cmp(&b.rank()),
    }
}

impl<U: Usage, G: UsageGroup, S: TreeSink> UsageTree<U, G, S> {
    /// Child group of `parent` for `group`, created and inserted in order if missing.
    pub fn add_group(&mut self, parent: NodeId, group: G, rule_index: i32) -> NodeId {
        if let Some(existing) = self.group(parent).subgroup(&group) {
            return existing;
        }

        debug!(%parent, group = %group, rule_index, "creating group node");
        let id = self.alloc(Node::new(
            Some(parent),
            NodeKind::Group(GroupNode::new(Some(group.clone()), rule_index)),
        ));
        self.group_mut(parent).subgroups.insert(group, id);
        self.insert_child(parent, id);
        id
    }

    /// Add `usage` under `parent`, merging it into an existing sibling when possible.
    ///
    /// A merged usage creates no node and leaves every count untouched; otherwise
    /// the new leaf is appended and the count of `parent` and each ancestor grows.
    pub fn add_usage(&mut self, parent: NodeId, usage: U) -> NodeId {
        if let Some(merged) = self.try_merge(parent, &usage) {
            debug!(%parent, node = %merged, "merged usage into existing node");
            self.sink.node_changed(merged);
            return merged;
        }

        let id = self.alloc(Node::new(
            Some(parent),
            NodeKind::Usage(UsageNode {
                usage,
                excluded: false,
            }),
        ));
        self.group_mut(parent).usages.push(id);

        let children = &mut self.node_mut(parent).children;
        let index = children.len();
        children.push(id);
        self.sink.node_inserted(parent, id, index);

        self.increment_usage_count(parent);
        id
    }

    /// Remove the usage node `usage` from anywhere below `parent`.
    ///
    /// Subgroups are searched before direct children. Every group from the
    /// containing one up to the root loses one usage, and any group left with
    /// no usages is detached, `parent` and its ancestors included.
    pub fn remove_usage(&mut self, parent: NodeId, usage: NodeId) -> bool {
        if !self.remove_usage_below(parent, usage) {
            return false;
        }

        let mut ancestor = self.node(parent).parent;
        while let Some(id) = ancestor {
            self.decrement_usage_count(id);
            ancestor = self.node(id).parent;
        }
        self.prune_empty(parent);
        true
    }

    /// Drop every child of `group` and report the subtree as reloaded.
    ///
    /// Ancestors lose the removed usages from their counts. A non-root group
    /// is detached afterwards, together with any ancestor left empty.
    pub fn remove_all_children(&mut self, group: NodeId) {
        let removed = self.group(group).recursive_usage_count;
        let children = std::mem::take(&mut self.node_mut(group).children);
        for child in children {
            self.release(child);
        }

        let node = self.group_mut(group);
        node.subgroups.clear();
        node.usages.clear();
        node.recursive_usage_count = 0;

        if removed > 0 {
            let mut ancestor = self.node(group).parent;
            while let Some(id) = ancestor {
                self.group_mut(id).recursive_usage_count -= removed;
                self.sink.node_changed(id);
                ancestor = self.node(id).parent;
            }
        }
        self.sink.subtree_reloaded(group);
        self.prune_empty(group);
    }

    /// Position at which `node` belongs among the current children of `parent`:
    /// the first child that does not sort before it.
    pub fn insertion_index(&self, parent: NodeId, node: NodeId) -> usize {
        let kind = &self.node(node).kind;
        self.node(parent)
            .children
            .iter()
            .position(|&child| compare_nodes(&self.node(child).kind, kind) != Ordering::Less)
            .unwrap_or_else(|| self.node(parent).children.len())
    }

    pub(crate) fn insert_child(&mut self, parent: NodeId, node: NodeId) -> NodeId {
        let index = self.insertion_index(parent, node);
        self.node_mut(parent).children.insert(index, node);
        self.sink.node_inserted(parent, node, index);
        node
    }

    fn try_merge(&mut self, parent: NodeId, usage: &U) -> Option<NodeId> {
        if !self.settings.filter_duplicate_lines || !usage.is_mergeable() {
            return None;
        }
        for index in 0..self.group(parent).usages.len() {
            let id = self.group(parent).usages[index];
            let existing = &mut self.usage_node_mut(id).usage;
            if existing.is_mergeable() && existing.merge(usage) {
                return Some(id);
            }
        }
        None
    }

    fn remove_usage_below(&mut self, parent: NodeId, usage: NodeId) -> bool {
        let subgroups: Vec<NodeId> = self.group(parent).subgroups.values().copied().collect();
        for subgroup in subgroups {
            if self.remove_usage_below(subgroup, usage) {
                self.decrement_usage_count(parent);
                if self.group(subgroup).recursive_usage_count == 0 {
                    self.detach_group(parent, subgroup);
                }
                return true;
            }
        }

        let Some(position) = self.group(parent).usages.iter().position(|&id| id == usage) else {
            return false;
        };
        self.group_mut(parent).usages.remove(position);
        self.detach_child(parent, usage);
        self.release(usage);
        self.decrement_usage_count(parent);
        true
    }

    /// Detach `group` and each ancestor left without usages, stopping at the root.
    fn prune_empty(&mut self, group: NodeId) {
        let mut current = group;
        while let Some(parent) = self.node(current).parent {
            if self.group(current).recursive_usage_count > 0 {
                break;
            }
            self.detach_group(parent, current);
            current = parent;
        }
    }

    fn increment_usage_count(&mut self, group: NodeId) {
        let mut current = Some(group);
        while let Some(id) = current {
            self.group_mut(id).recursive_usage_count += 1;
            self.sink.node_changed(id);
            current = self.node(id).parent;
        }
    }

    fn decrement_usage_count(&mut self, group: NodeId) {
        self.group_mut(group).recursive_usage_count -= 1;
        self.sink.node_changed(group);
    }

    fn detach_group(&mut self, parent: NodeId, subgroup: NodeId) {
        if let Some(key) = self.group(subgroup).group.clone() {
            self.group_mut(parent).subgroups.remove(&key);
        }
        debug!(%parent, node = %subgroup, "pruning empty group node");
        self.detach_child(parent, subgroup);
        self.release(subgroup);
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId) {
        let children = &mut self.node_mut(parent).children;
        if let Some(index) = children.iter().position(|&id| id == child) {
            children.remove(index);
        }
        self.sink.node_removed(parent, child);
    }
}
