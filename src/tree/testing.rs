//! Fixtures shared by the tree tests

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::tree::group::compare_nodes;
use crate::tree::{NodeId, NodeKind, RecordingSink, TreeSettings, UsageTree};
use crate::usages::usage::{GroupingRule, Usage, UsageGroup};

pub(crate) type TestTree = UsageTree<TestUsage, TestGroup, RecordingSink>;

#[derive(Debug)]
pub(crate) struct TestUsage {
    pub file: String,
    pub line: u32,
    pub mergeable: bool,
    pub read: bool,
    pub write: bool,
    pub merged: usize,
    pub updates: usize,
    valid: Rc<Cell<bool>>,
    read_only: Rc<Cell<bool>>,
}

impl TestUsage {
    pub fn new(file: &str, line: u32) -> Self {
        Self {
            file: file.to_string(),
            line,
            mergeable: false,
            read: false,
            write: false,
            merged: 0,
            updates: 0,
            valid: Rc::new(Cell::new(true)),
            read_only: Rc::new(Cell::new(false)),
        }
    }

    pub fn mergeable(mut self) -> Self {
        self.mergeable = true;
        self
    }

    pub fn reading(mut self) -> Self {
        self.read = true;
        self
    }

    pub fn writing(mut self) -> Self {
        self.write = true;
        self
    }

    pub fn read_only(self) -> Self {
        self.read_only.set(true);
        self
    }

    pub fn valid_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.valid)
    }

    pub fn read_only_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.read_only)
    }
}

impl fmt::Display for TestUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

impl Usage for TestUsage {
    fn is_valid(&self) -> bool {
        self.valid.get()
    }

    fn is_read_only(&self) -> bool {
        self.read_only.get()
    }

    fn is_mergeable(&self) -> bool {
        self.mergeable
    }

    fn merge(&mut self, other: &Self) -> bool {
        if self.file != other.file || self.line != other.line {
            return false;
        }
        self.read |= other.read;
        self.write |= other.write;
        self.merged += 1;
        true
    }

    fn update(&mut self) {
        self.updates += 1;
    }
}

/// Group keyed by name; validity is shared with the test through a handle.
#[derive(Debug, Clone)]
pub(crate) struct TestGroup {
    pub name: String,
    valid: Rc<Cell<bool>>,
}

impl TestGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            valid: Rc::new(Cell::new(true)),
        }
    }

    pub fn valid_handle(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.valid)
    }
}

impl PartialEq for TestGroup {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TestGroup {}

impl Hash for TestGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for TestGroup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TestGroup {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for TestGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl UsageGroup for TestGroup {
    fn is_valid(&self) -> bool {
        self.valid.get()
    }
}

pub(crate) fn by_file() -> Box<dyn GroupingRule<TestUsage, TestGroup>> {
    Box::new(|usage: &TestUsage| Some(TestGroup::new(&usage.file)))
}

/// Groups by the part before the last '/', skipping files without one.
pub(crate) fn by_dir() -> Box<dyn GroupingRule<TestUsage, TestGroup>> {
    Box::new(|usage: &TestUsage| {
        usage
            .file
            .rsplit_once('/')
            .map(|(dir, _)| TestGroup::new(dir))
    })
}

pub(crate) fn tree_with(rules: Vec<Box<dyn GroupingRule<TestUsage, TestGroup>>>) -> TestTree {
    UsageTree::new(rules, TreeSettings::default(), RecordingSink::new())
}

/// Check every structural invariant of the tree.
pub(crate) fn assert_invariants(tree: &TestTree) {
    let root = tree.root();
    let leaves = check_group(tree, root);
    assert_eq!(leaves, tree.usage_nodes().len());
    assert_eq!(tree.recursive_usage_count(root), leaves);
}

/// Returns the number of usage nodes below `id`.
fn check_group(tree: &TestTree, id: NodeId) -> usize {
    let NodeKind::Group(group) = tree.kind(id) else {
        panic!("{id} is not a group");
    };
    let children = tree.children(id);

    for pair in children.windows(2) {
        assert_ne!(
            compare_nodes(tree.kind(pair[0]), tree.kind(pair[1])),
            Ordering::Greater,
            "children of {id} out of order"
        );
    }

    let mut total = 0;
    let mut subgroups = 0;
    let mut usages = Vec::new();
    for &child in children {
        assert_eq!(tree.parent(child), Some(id), "broken parent link of {child}");
        match tree.kind(child) {
            NodeKind::Group(sub) => {
                subgroups += 1;
                let key = sub.group().expect("only the root has no key");
                assert_eq!(group.subgroup(key), Some(child), "orphan subgroup {child}");
                let count = check_group(tree, child);
                assert!(count > 0, "empty group {child} is still attached");
                total += count;
            }
            NodeKind::Usage(_) => {
                usages.push(child);
                total += 1;
            }
            NodeKind::Target(_) => {}
        }
    }

    assert_eq!(group.subgroup_count(), subgroups, "stale subgroup entries in {id}");
    let registered: HashSet<NodeId> = group.usages().iter().copied().collect();
    assert_eq!(registered, usages.into_iter().collect::<HashSet<_>>());
    assert_eq!(group.recursive_usage_count(), total, "wrong count on {id}");
    total
}
