//! Capabilities the tree expects from usages and group keys

use std::fmt;
use std::hash::Hash;

/// One occurrence of a searched-for element.
///
/// Identity is the node that wraps the usage, never the value itself: two equal
/// occurrences inserted separately are two usages unless one merges into the other.
pub trait Usage: fmt::Display {
    /// Whether the underlying resource (e.g. the file) still exists.
    fn is_valid(&self) -> bool {
        true
    }

    fn is_read_only(&self) -> bool {
        false
    }

    /// Whether this usage supports merging with another usage of the same kind.
    fn is_mergeable(&self) -> bool {
        false
    }

    /// Try to absorb `other` into `self`. Returns `true` when `other` is now
    /// represented by `self` and must not get a node of its own.
    fn merge(&mut self, _other: &Self) -> bool {
        false
    }

    /// Hook invoked when the wrapping node's cached state changed.
    fn update(&mut self) {}
}

/// A grouping bucket key produced by a grouping rule.
///
/// `Ord` is the display order among groups produced by the same rule.
pub trait UsageGroup: Clone + Eq + Hash + Ord + fmt::Display {
    /// Whether the grouped resource still exists.
    fn is_valid(&self) -> bool {
        true
    }

    /// Hook invoked when the wrapping node's cached state changed.
    fn update(&self) {}
}

/// One classifier in the grouping chain.
pub trait GroupingRule<U, G> {
    /// The group `usage` belongs to under this rule, if the rule applies.
    fn group_for(&self, usage: &U) -> Option<G>;
}

impl<U, G, F> GroupingRule<U, G> for F
where
    F: Fn(&U) -> Option<G>,
{
    fn group_for(&self, usage: &U) -> Option<G> {
        self(usage)
    }
}
