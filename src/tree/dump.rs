//! Textual and serializable views of a usage tree

use serde::Serialize;

use crate::tree::sink::TreeSink;
use crate::tree::{NodeId, NodeKind, UsageTree};
use crate::usages::usage::{Usage, UsageGroup};

/// Kind of a snapshot node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    Root,
    Target,
    Group,
    Usage,
}

/// Owned copy of a subtree, as shown to a reader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub kind: SnapshotKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Recursive usage count, for groups and the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    pub valid: bool,
    pub read_only: bool,
    pub excluded: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Visit every usage snapshot along with the labels of its enclosing groups.
    pub fn for_each_usage<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&[&'a str], &'a NodeSnapshot),
    {
        let mut path = Vec::new();
        self.walk_usages(&mut path, &mut f);
    }

    fn walk_usages<'a, F>(&'a self, path: &mut Vec<&'a str>, f: &mut F)
    where
        F: FnMut(&[&'a str], &'a NodeSnapshot),
    {
        match self.kind {
            SnapshotKind::Usage => f(path, self),
            SnapshotKind::Target => {}
            SnapshotKind::Root | SnapshotKind::Group => {
                let pushed = match (&self.kind, &self.label) {
                    (SnapshotKind::Group, Some(label)) => {
                        path.push(label.as_str());
                        true
                    }
                    _ => false,
                };
                for child in &self.children {
                    child.walk_usages(path, f);
                }
                if pushed {
                    path.pop();
                }
            }
        }
    }
}

impl<U: Usage, G: UsageGroup, S: TreeSink> UsageTree<U, G, S> {
    /// Debug dump: one bracketed block per group, children indented by four.
    pub fn tree2string(&self, id: NodeId, indent: usize, separator: &str) -> String {
        let mut result = String::new();
        append_spaces(&mut result, indent);

        let node = self.node(id);
        match &node.kind {
            NodeKind::Target(target) => result.push_str(&target.label),
            NodeKind::Usage(usage) => result.push_str(&usage.usage.to_string()),
            NodeKind::Group(group) => {
                if let Some(group) = group.group() {
                    result.push_str(&group.to_string());
                }
                result.push('[');
                result.push_str(separator);

                for &child in &node.children {
                    result.push_str(&self.tree2string(child, indent + 4, separator));
                    result.push_str(separator);
                }

                append_spaces(&mut result, indent);
                result.push(']');
                result.push_str(separator);
            }
        }
        result
    }

    /// Snapshot of the subtree under `id`.
    pub fn snapshot_of(&self, id: NodeId) -> NodeSnapshot {
        let node = self.node(id);
        let (kind, label, count) = match &node.kind {
            NodeKind::Target(target) => (SnapshotKind::Target, Some(target.label.clone()), None),
            NodeKind::Usage(usage) => (SnapshotKind::Usage, Some(usage.usage.to_string()), None),
            NodeKind::Group(group) => {
                let kind = if node.parent.is_none() {
                    SnapshotKind::Root
                } else {
                    SnapshotKind::Group
                };
                (
                    kind,
                    group.group().map(ToString::to_string),
                    Some(group.recursive_usage_count()),
                )
            }
        };

        NodeSnapshot {
            kind,
            label,
            count,
            valid: self.is_valid(id),
            read_only: self.is_read_only(id),
            excluded: self.is_excluded(id),
            children: node.children.iter().map(|&c| self.snapshot_of(c)).collect(),
        }
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        self.snapshot_of(self.root())
    }
}

fn append_spaces(s: &mut String, spaces: usize) {
    s.extend(std::iter::repeat(' ').take(spaces));
}
