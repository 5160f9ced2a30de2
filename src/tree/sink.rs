//! Tree-change notifications
//!
//! The tree never touches presentation state; it reports every structural or
//! state edit to a sink, which a host can forward to whatever widget it drives.

use serde::Serialize;
use tracing::trace;

use crate::tree::NodeId;

/// Receiver of tree-change notifications.
pub trait TreeSink {
    /// `node` was inserted under `parent` at child position `index`.
    fn node_inserted(&mut self, parent: NodeId, node: NodeId, index: usize);

    /// `node` was detached from `parent`.
    fn node_removed(&mut self, parent: NodeId, node: NodeId);

    /// `node`'s displayed state (count, flags, content) changed.
    fn node_changed(&mut self, node: NodeId);

    /// Everything below `node` was replaced.
    fn subtree_reloaded(&mut self, node: NodeId);
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TreeSink for NullSink {
    fn node_inserted(&mut self, _parent: NodeId, _node: NodeId, _index: usize) {}
    fn node_removed(&mut self, _parent: NodeId, _node: NodeId) {}
    fn node_changed(&mut self, _node: NodeId) {}
    fn subtree_reloaded(&mut self, _node: NodeId) {}
}

/// A recorded notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TreeEvent {
    Inserted {
        parent: NodeId,
        node: NodeId,
        index: usize,
    },
    Removed {
        parent: NodeId,
        node: NodeId,
    },
    Changed {
        node: NodeId,
    },
    Reloaded {
        node: NodeId,
    },
}

/// Sink that keeps every notification in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<TreeEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded events
    pub fn take(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of `Changed` events recorded for `node`
    pub fn changes_of(&self, node: NodeId) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TreeEvent::Changed { node: n } if *n == node))
            .count()
    }
}

impl TreeSink for RecordingSink {
    fn node_inserted(&mut self, parent: NodeId, node: NodeId, index: usize) {
        self.events.push(TreeEvent::Inserted {
            parent,
            node,
            index,
        });
    }

    fn node_removed(&mut self, parent: NodeId, node: NodeId) {
        self.events.push(TreeEvent::Removed { parent, node });
    }

    fn node_changed(&mut self, node: NodeId) {
        self.events.push(TreeEvent::Changed { node });
    }

    fn subtree_reloaded(&mut self, node: NodeId) {
        self.events.push(TreeEvent::Reloaded { node });
    }
}

/// Sink that logs every notification at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TreeSink for TracingSink {
    fn node_inserted(&mut self, parent: NodeId, node: NodeId, index: usize) {
        trace!(%parent, %node, index, "node inserted");
    }

    fn node_removed(&mut self, parent: NodeId, node: NodeId) {
        trace!(%parent, %node, "node removed");
    }

    fn node_changed(&mut self, node: NodeId) {
        trace!(%node, "node changed");
    }

    fn subtree_reloaded(&mut self, node: NodeId) {
        trace!(%node, "subtree reloaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.node_inserted(NodeId(0), NodeId(1), 0);
        sink.node_changed(NodeId(0));
        sink.node_removed(NodeId(0), NodeId(1));
        sink.subtree_reloaded(NodeId(0));

        assert_eq!(
            sink.events,
            vec![
                TreeEvent::Inserted {
                    parent: NodeId(0),
                    node: NodeId(1),
                    index: 0
                },
                TreeEvent::Changed { node: NodeId(0) },
                TreeEvent::Removed {
                    parent: NodeId(0),
                    node: NodeId(1)
                },
                TreeEvent::Reloaded { node: NodeId(0) },
            ]
        );
        assert_eq!(sink.changes_of(NodeId(0)), 1);
    }

    #[test]
    fn test_recording_sink_take_drains() {
        let mut sink = RecordingSink::new();
        sink.node_changed(NodeId(3));
        assert_eq!(sink.take().len(), 1);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&TreeEvent::Changed { node: NodeId(7) }).unwrap();
        assert_eq!(json, r#"{"event":"changed","node":7}"#);
    }
}
