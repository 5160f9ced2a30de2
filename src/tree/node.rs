//! Cached node state: validity, read-only and exclusion
//!
//! `valid` and `excluded` are refreshed by every [`UsageTree::update`]. The
//! read-only flag is computed the first time it is asked for and then kept until
//! an update sees a different value or [`UsageTree::reset_read_only`] drops it.

use std::cell::Cell;

use crate::tree::sink::TreeSink;
use crate::tree::{NodeId, NodeKind, UsageTree};
use crate::usages::usage::{Usage, UsageGroup};

/// Cached tri-state of one node
#[derive(Debug, Clone)]
pub struct NodeState {
    valid: bool,
    read_only: Cell<Option<bool>>,
    excluded: bool,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            valid: true,
            read_only: Cell::new(None),
            excluded: false,
        }
    }
}

impl NodeState {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    /// Read-only flag, if it was ever computed
    pub fn cached_read_only(&self) -> Option<bool> {
        self.read_only.get()
    }

    /// Store freshly computed flags. Returns whether anything differed.
    fn apply(&mut self, valid: bool, read_only: bool, excluded: bool) -> bool {
        let changed = valid != self.valid
            || self.read_only.get() != Some(read_only)
            || excluded != self.excluded;
        if changed {
            self.valid = valid;
            self.read_only.set(Some(read_only));
            self.excluded = excluded;
        }
        changed
    }
}

impl<U: Usage, G: UsageGroup, S: TreeSink> UsageTree<U, G, S> {
    pub fn is_valid(&self, id: NodeId) -> bool {
        self.node(id).state.is_valid()
    }

    /// Read-only flag of `id`, computed and cached on first call.
    pub fn is_read_only(&self, id: NodeId) -> bool {
        let state = &self.node(id).state;
        match state.read_only.get() {
            Some(read_only) => read_only,
            None => {
                let read_only = self.is_data_read_only(id);
                state.read_only.set(Some(read_only));
                read_only
            }
        }
    }

    pub fn is_excluded(&self, id: NodeId) -> bool {
        self.node(id).state.is_excluded()
    }

    /// Forget the cached read-only flag of `id`; the next read recomputes it.
    pub fn reset_read_only(&mut self, id: NodeId) {
        self.node(id).state.read_only.set(None);
    }

    /// Recompute the flags of `id` from its data and notify the sink only when
    /// one of them differs from the cached value.
    pub fn update(&mut self, id: NodeId) {
        let valid = self.is_data_valid(id);
        let read_only = self.is_data_read_only(id);
        let excluded = self.is_data_excluded(id);

        if self.node_mut(id).state.apply(valid, read_only, excluded) {
            self.update_notify(id);
            self.sink.node_changed(id);
        }
    }

    fn update_notify(&mut self, id: NodeId) {
        match &mut self.node_mut(id).kind {
            NodeKind::Group(group) => {
                if let Some(group) = group.group() {
                    group.update();
                }
            }
            NodeKind::Usage(node) => node.usage.update(),
            NodeKind::Target(_) => {}
        }
    }

    fn is_data_valid(&self, id: NodeId) -> bool {
        match &self.node(id).kind {
            NodeKind::Target(_) => true,
            NodeKind::Group(group) => group.group().map_or(true, UsageGroup::is_valid),
            NodeKind::Usage(node) => node.usage.is_valid(),
        }
    }

    fn is_data_read_only(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Target(_) => false,
            NodeKind::Group(_) => node.children.iter().any(|&child| self.is_read_only(child)),
            NodeKind::Usage(usage) => usage.usage.is_read_only(),
        }
    }

    fn is_data_excluded(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Target(_) => false,
            NodeKind::Group(_) => node.children.iter().all(|&child| self.is_excluded(child)),
            NodeKind::Usage(usage) => usage.excluded,
        }
    }
}
