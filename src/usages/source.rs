//! Usages backed by a line of a source file

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::core::model::Span;
use crate::usages::access::Access;
use crate::usages::usage::Usage;

/// One line of a file that references a search target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceUsage {
    /// Path relative to root, using '/' as separator
    pub path: String,

    #[serde(skip)]
    pub abs_path: PathBuf,

    pub line: u32,

    /// Line text shown for the usage
    pub text: String,

    /// Every match merged into this usage, sorted
    pub spans: Vec<Span>,

    /// Read/write access, when the usage was classified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
}

impl SourceUsage {
    /// Directory part of `path`, `.` for files at the root
    pub fn dir(&self) -> &str {
        self.path.rsplit_once('/').map_or(".", |(dir, _)| dir)
    }
}

impl fmt::Display for SourceUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line, self.text.trim())
    }
}

impl Usage for SourceUsage {
    fn is_valid(&self) -> bool {
        self.abs_path.is_file()
    }

    fn is_read_only(&self) -> bool {
        std::fs::metadata(&self.abs_path)
            .map(|m| m.permissions().readonly())
            .unwrap_or(false)
    }

    fn is_mergeable(&self) -> bool {
        true
    }

    /// Usages on the same line of the same file become one.
    fn merge(&mut self, other: &Self) -> bool {
        if self.abs_path != other.abs_path || self.line != other.line {
            return false;
        }

        for span in &other.spans {
            if let Err(pos) = self.spans.binary_search(span) {
                self.spans.insert(pos, *span);
            }
        }
        self.access = match (self.access, other.access) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn usage(line: u32, start: usize, access: Option<Access>) -> SourceUsage {
        SourceUsage {
            path: "src/lib.rs".to_string(),
            abs_path: PathBuf::from("/nowhere/src/lib.rs"),
            line,
            text: "count = count + 1;".to_string(),
            spans: vec![Span::new(start, start + 5)],
            access,
        }
    }

    #[test]
    fn test_merge_unions_access() {
        let mut first = usage(3, 8, Some(Access::READ));
        let second = usage(3, 0, Some(Access::WRITE));

        assert!(first.merge(&second));
        assert_eq!(first.access, Some(Access::READ_WRITE));
        assert_eq!(first.spans, vec![Span::new(0, 5), Span::new(8, 13)]);
    }

    #[test]
    fn test_merge_keeps_classification() {
        let mut plain = usage(3, 0, None);
        assert!(plain.merge(&usage(3, 8, Some(Access::READ))));
        assert_eq!(plain.access, Some(Access::READ));
    }

    #[test]
    fn test_merge_deduplicates_spans() {
        let mut first = usage(3, 0, None);
        assert!(first.merge(&usage(3, 0, None)));
        assert_eq!(first.spans.len(), 1);
    }

    #[test]
    fn test_merge_rejects_other_line() {
        let mut first = usage(3, 0, None);
        assert!(!first.merge(&usage(4, 0, None)));
        assert_eq!(first.spans.len(), 1);
    }

    #[test]
    fn test_display_and_dir() {
        let u = usage(12, 0, None);
        assert_eq!(u.to_string(), "12: count = count + 1;");
        assert_eq!(u.dir(), "src");

        let mut top = usage(1, 0, None);
        top.path = "main.rs".to_string();
        assert_eq!(top.dir(), ".");
    }

    #[test]
    fn test_validity_and_read_only_follow_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("lib.rs");
        std::fs::write(&path, "count\n").unwrap();

        let mut u = usage(1, 0, None);
        u.abs_path = path.clone();
        assert!(u.is_valid());
        assert!(!u.is_read_only());

        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&path, perms).unwrap();
        assert!(u.is_read_only());

        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        std::fs::set_permissions(&path, perms).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(!u.is_valid());
        assert!(!u.is_read_only());
    }
}
