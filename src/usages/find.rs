//! Search-to-tree pipeline
//!
//! Runs a backend for a [`TargetDescriptor`], converts the hits and feeds them
//! into a [`UsageTree`] one at a time from the calling thread.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::backends::{search, Backend, SearchOptions};
use crate::error::Result;
use crate::tree::sink::TracingSink;
use crate::tree::{TreeSettings, UsageTree};
use crate::usages::convert::{Classifier, ExcerptLimit, TargetDescriptor};
use crate::usages::rules::{build_rules, RuleKind, SearchGroup};
use crate::usages::source::SourceUsage;

/// Line excerpts longer than this are truncated
pub const DEFAULT_EXCERPT_BYTES: usize = 200;

/// Tree of source usages as built for the CLI
pub type SearchTree = UsageTree<SourceUsage, SearchGroup, TracingSink>;

/// Everything needed to build a usage tree for one search
#[derive(Debug, Clone)]
pub struct FindRequest {
    pub descriptor: TargetDescriptor,
    pub rules: Vec<RuleKind>,
    pub backend: Backend,
    pub options: SearchOptions,
    pub settings: TreeSettings,
    pub max_usages: Option<usize>,
    pub excerpt_bytes: usize,
    pub show_targets: bool,
    pub purge_invalid: bool,
}

impl FindRequest {
    pub fn new(descriptor: TargetDescriptor) -> Self {
        Self {
            descriptor,
            rules: RuleKind::all().to_vec(),
            backend: Backend::default(),
            options: SearchOptions::default(),
            settings: TreeSettings::default(),
            max_usages: None,
            excerpt_bytes: DEFAULT_EXCERPT_BYTES,
            show_targets: false,
            purge_invalid: false,
        }
    }
}

/// Search under `root` and group the results
pub fn find_usages(root: &Path, request: &FindRequest) -> Result<SearchTree> {
    let pattern = request.descriptor.pattern();
    let mut hits = search(request.backend, root, &pattern, &request.options)?;

    let found = hits.len();
    hits.retain(|hit| request.descriptor.find(hit.matched()).is_some());
    if hits.len() < found {
        debug!(dropped = found - hits.len(), "dropping hits that name no target");
    }

    if let Some(max) = request.max_usages {
        if hits.len() > max {
            warn!(found = hits.len(), max, "usage limit reached, dropping the rest");
            hits.truncate(max);
        }
    }

    let classifier = Classifier::new(request.descriptor.clone())
        .with_converter(ExcerptLimit(request.excerpt_bytes));

    let mut tree = UsageTree::new(build_rules(&request.rules), request.settings, TracingSink);

    if request.show_targets {
        let descriptor = classifier.descriptor();
        for target in descriptor.primary() {
            tree.add_target(target.name.clone());
        }
        for target in descriptor.additional() {
            tree.add_target(format!("{} (additional)", target.name));
        }
    }

    for usage in classifier.convert_all(&hits) {
        tree.append_usage(usage);
    }
    tree.update_all();

    if request.purge_invalid {
        let purged = tree.purge_invalid();
        debug!(purged, "purged invalid usages");
    }

    let root_id = tree.root();
    info!(
        hits = hits.len(),
        usages = tree.recursive_usage_count(root_id),
        "usage tree built"
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::dump::SnapshotKind;
    use crate::usages::convert::{SearchTarget, TargetKind};
    use std::fs;
    use tempfile::tempdir;

    fn request(names: &[&str], kind: TargetKind) -> FindRequest {
        let targets = names.iter().map(|n| SearchTarget::new(*n, kind)).collect();
        let mut request = FindRequest::new(TargetDescriptor::new(targets).unwrap());
        request.backend = Backend::Builtin;
        request
    }

    fn project() -> tempfile::TempDir {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(
            temp.path().join("src/counter.rs"),
            "let mut count = 0;\ncount += 1;\nprintln!(\"{}\", count);\n",
        )
        .unwrap();
        fs::write(temp.path().join("main.rs"), "count = count * 2;\n").unwrap();
        temp
    }

    #[test]
    fn test_find_groups_by_access_dir_file() {
        let temp = project();
        let tree = find_usages(temp.path(), &request(&["count"], TargetKind::Variable)).unwrap();
        let snapshot = tree.snapshot();

        let groups: Vec<_> = snapshot
            .children
            .iter()
            .map(|c| c.label.as_deref().unwrap())
            .collect();
        assert_eq!(groups, vec!["Write access", "Read/write access", "Read access"]);

        // The two references on `count = count * 2` land in different access
        // groups, so they are not merged.
        assert_eq!(tree.recursive_usage_count(tree.root()), 5);
        let counts: Vec<_> = snapshot.children.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![Some(2), Some(1), Some(2)]);
    }

    #[test]
    fn test_find_merges_same_line_without_access() {
        let temp = project();
        let mut request = request(&["count"], TargetKind::Text);
        request.rules = vec![RuleKind::Dir, RuleKind::File];
        let tree = find_usages(temp.path(), &request).unwrap();
        assert_eq!(tree.recursive_usage_count(tree.root()), 4);

        request.settings = TreeSettings {
            filter_duplicate_lines: false,
        };
        let tree = find_usages(temp.path(), &request).unwrap();
        assert_eq!(tree.recursive_usage_count(tree.root()), 5);
    }

    #[test]
    fn test_find_text_targets_are_not_classified() {
        let temp = project();
        let mut request = request(&["count"], TargetKind::Text);
        request.rules = vec![RuleKind::Type, RuleKind::File];
        let tree = find_usages(temp.path(), &request).unwrap();

        let snapshot = tree.snapshot();
        let labels: Vec<_> = snapshot
            .children
            .iter()
            .map(|c| c.label.as_deref().unwrap())
            .collect();
        assert_eq!(labels, vec!["main.rs", "src/counter.rs"]);
    }

    #[test]
    fn test_find_respects_max_usages() {
        let temp = project();
        let mut request = request(&["count"], TargetKind::Text);
        request.max_usages = Some(1);
        request.settings = TreeSettings {
            filter_duplicate_lines: false,
        };
        let tree = find_usages(temp.path(), &request).unwrap();
        assert_eq!(tree.recursive_usage_count(tree.root()), 1);
    }

    #[test]
    fn test_find_adds_targets_first() {
        let temp = project();
        let mut request = request(&["count"], TargetKind::Text);
        request.show_targets = true;
        let tree = find_usages(temp.path(), &request).unwrap();

        let snapshot = tree.snapshot();
        assert_eq!(snapshot.children[0].kind, SnapshotKind::Target);
        assert_eq!(snapshot.children[0].label.as_deref(), Some("count"));
    }

    #[test]
    fn test_find_no_hits() {
        let temp = project();
        let tree = find_usages(temp.path(), &request(&["missing"], TargetKind::Text)).unwrap();
        assert_eq!(tree.recursive_usage_count(tree.root()), 0);
        assert!(tree.children(tree.root()).is_empty());
    }
}
