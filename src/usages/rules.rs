//! Grouping rules for source usages
//!
//! Rules are chosen by name and applied in the order given; the first rule
//! produces the top level of the tree.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, SearchError};
use crate::usages::access::Access;
use crate::usages::source::SourceUsage;
use crate::usages::usage::{GroupingRule, UsageGroup};

/// Access bucket of a classified usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessGroup {
    Write,
    ReadWrite,
    Read,
}

impl AccessGroup {
    fn of(access: Access) -> Option<Self> {
        match (access.read, access.write) {
            (true, true) => Some(AccessGroup::ReadWrite),
            (false, true) => Some(AccessGroup::Write),
            (true, false) => Some(AccessGroup::Read),
            (false, false) => None,
        }
    }
}

impl fmt::Display for AccessGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessGroup::Write => "Write access",
            AccessGroup::ReadWrite => "Read/write access",
            AccessGroup::Read => "Read access",
        })
    }
}

/// Group key produced by the source usage rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchGroup {
    Access(AccessGroup),
    Directory { path: String, abs_path: PathBuf },
    File { path: String, abs_path: PathBuf },
}

impl fmt::Display for SearchGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchGroup::Access(access) => fmt::Display::fmt(access, f),
            SearchGroup::Directory { path, .. } | SearchGroup::File { path, .. } => {
                f.write_str(path)
            }
        }
    }
}

impl UsageGroup for SearchGroup {
    fn is_valid(&self) -> bool {
        match self {
            SearchGroup::Access(_) => true,
            SearchGroup::Directory { abs_path, .. } => abs_path.is_dir(),
            SearchGroup::File { abs_path, .. } => abs_path.is_file(),
        }
    }
}

/// Named grouping rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// By read/write access; skipped for unclassified usages
    Type,
    /// By containing directory
    Dir,
    /// By containing file
    File,
}

impl std::str::FromStr for RuleKind {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "type" | "access" => Ok(RuleKind::Type),
            "dir" | "directory" => Ok(RuleKind::Dir),
            "file" => Ok(RuleKind::File),
            _ => Err(SearchError::UnknownRule(s.to_string())),
        }
    }
}

impl RuleKind {
    pub fn all() -> [RuleKind; 3] {
        [RuleKind::Type, RuleKind::Dir, RuleKind::File]
    }

    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Type => "type",
            RuleKind::Dir => "dir",
            RuleKind::File => "file",
        }
    }

    pub fn into_rule(self) -> Box<dyn GroupingRule<SourceUsage, SearchGroup>> {
        match self {
            RuleKind::Type => Box::new(AccessRule),
            RuleKind::Dir => Box::new(DirectoryRule),
            RuleKind::File => Box::new(FileRule),
        }
    }
}

/// Parse rule names such as `["type", "dir", "file"]`, keeping their order.
pub fn parse_rules<S: AsRef<str>>(names: &[S]) -> Result<Vec<RuleKind>> {
    names
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !name.trim().is_empty())
        .map(|name| name.parse::<RuleKind>())
        .collect()
}

pub fn build_rules(kinds: &[RuleKind]) -> Vec<Box<dyn GroupingRule<SourceUsage, SearchGroup>>> {
    kinds.iter().map(|kind| kind.into_rule()).collect()
}

pub struct AccessRule;

impl GroupingRule<SourceUsage, SearchGroup> for AccessRule {
    fn group_for(&self, usage: &SourceUsage) -> Option<SearchGroup> {
        usage
            .access
            .and_then(AccessGroup::of)
            .map(SearchGroup::Access)
    }
}

pub struct DirectoryRule;

impl GroupingRule<SourceUsage, SearchGroup> for DirectoryRule {
    fn group_for(&self, usage: &SourceUsage) -> Option<SearchGroup> {
        let abs_path = usage.abs_path.parent()?.to_path_buf();
        Some(SearchGroup::Directory {
            path: usage.dir().to_string(),
            abs_path,
        })
    }
}

pub struct FileRule;

impl GroupingRule<SourceUsage, SearchGroup> for FileRule {
    fn group_for(&self, usage: &SourceUsage) -> Option<SearchGroup> {
        Some(SearchGroup::File {
            path: usage.path.clone(),
            abs_path: usage.abs_path.clone(),
        })
    }
}
