use super::testing::{assert_invariants, tree_with, TestGroup, TestTree, TestUsage};
use super::*;

use proptest::prelude::*;

const DIRS: [&str; 3] = ["a", "b", "c"];
const FILES: [&str; 2] = ["x.rs", "y.rs"];
const TARGETS: [&str; 2] = ["count", "set_count"];
const DEPTH: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Add {
        dirs: Vec<usize>,
        file: usize,
        line: u32,
        mergeable: bool,
    },
    Remove(usize),
    Exclude(usize, bool),
    Clear(usize),
    AddTarget(usize),
    Update,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (
            prop::collection::vec(0..DIRS.len(), 0..=DEPTH),
            0..FILES.len(),
            1u32..4,
            any::<bool>()
        )
            .prop_map(|(dirs, file, line, mergeable)| Op::Add {
                dirs,
                file,
                line,
                mergeable
            }),
        3 => any::<usize>().prop_map(Op::Remove),
        1 => (any::<usize>(), any::<bool>()).prop_map(|(i, e)| Op::Exclude(i, e)),
        1 => any::<usize>().prop_map(Op::Clear),
        1 => (0..TARGETS.len()).prop_map(Op::AddTarget),
        1 => Just(Op::Update),
    ]
}

/// One rule per directory level, then one for the file itself.
fn nested_tree() -> TestTree {
    let mut rules: Vec<Box<dyn crate::usages::usage::GroupingRule<TestUsage, TestGroup>>> =
        Vec::new();
    for level in 0..DEPTH {
        rules.push(Box::new(move |usage: &TestUsage| {
            let parts: Vec<&str> = usage.file.split('/').collect();
            (parts.len() > level + 1).then(|| TestGroup::new(&parts[..=level].join("/")))
        }));
    }
    rules.push(Box::new(|usage: &TestUsage| Some(TestGroup::new(&usage.file))));
    tree_with(rules)
}

fn file_path(dirs: &[usize], file: usize) -> String {
    let mut parts: Vec<&str> = dirs.iter().map(|&d| DIRS[d]).collect();
    parts.push(FILES[file]);
    parts.join("/")
}

fn group_nodes(tree: &TestTree) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        if let NodeKind::Group(_) = tree.kind(id) {
            out.push(id);
            stack.extend(tree.children(id).iter().copied());
        }
    }
    out
}

fn apply(tree: &mut TestTree, op: &Op, removed: &mut Vec<NodeId>) {
    match op {
        Op::Add {
            dirs,
            file,
            line,
            mergeable,
        } => {
            let mut usage = TestUsage::new(&file_path(dirs, *file), *line);
            if *mergeable {
                usage = usage.mergeable();
            }
            let before = tree.usage_nodes().len();
            let id = tree.append_usage(usage);
            let after = tree.usage_nodes().len();
            assert!(after == before || after == before + 1);
            assert!(tree.contains(id));
        }
        Op::Remove(index) => {
            let nodes = tree.usage_nodes();
            if nodes.is_empty() {
                return;
            }
            let id = nodes[index % nodes.len()];
            let root = tree.root();
            assert!(tree.remove_usage(root, id));
            assert!(!tree.contains(id));
            removed.push(id);
        }
        Op::Exclude(index, excluded) => {
            let nodes = tree.usage_nodes();
            if nodes.is_empty() {
                return;
            }
            tree.set_usage_excluded(nodes[index % nodes.len()], *excluded);
        }
        Op::Clear(index) => {
            let groups = group_nodes(tree);
            let group = groups[index % groups.len()];
            let before = tree.usage_nodes();
            let dropped = tree.recursive_usage_count(group);
            tree.remove_all_children(group);
            assert_eq!(tree.usage_nodes().len(), before.len() - dropped);
            removed.extend(before.into_iter().filter(|&id| !tree.contains(id)));
        }
        Op::AddTarget(index) => {
            let id = tree.add_target(TARGETS[*index]);
            assert_eq!(tree.parent(id), Some(tree.root()));
        }
        Op::Update => tree.update_all(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_invariants_hold_after_every_edit(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut tree = nested_tree();
        let mut removed = Vec::new();
        for op in &ops {
            apply(&mut tree, op, &mut removed);
            assert_invariants(&tree);
        }

        let root = tree.root();
        for id in removed {
            prop_assert!(!tree.remove_usage(root, id));
        }
    }

    #[test]
    fn prop_removing_everything_empties_tree(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut tree = nested_tree();
        let mut removed = Vec::new();
        for op in &ops {
            apply(&mut tree, op, &mut removed);
        }

        let root = tree.root();
        for id in tree.usage_nodes() {
            prop_assert!(tree.remove_usage(root, id));
            assert_invariants(&tree);
        }
        prop_assert_eq!(tree.recursive_usage_count(root), 0);
        prop_assert!(tree
            .children(root)
            .iter()
            .all(|&child| matches!(tree.kind(child), NodeKind::Target(_))));
        prop_assert_eq!(tree.group(root).subgroup_count(), 0);
    }

    #[test]
    fn prop_second_update_is_silent(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut tree = nested_tree();
        let mut removed = Vec::new();
        for op in &ops {
            apply(&mut tree, op, &mut removed);
        }

        tree.update_all();
        tree.sink_mut().take();
        tree.update_all();
        prop_assert!(tree.sink().events.is_empty());
    }
}
