//! Search hit model
//!
//! Every search backend must map its output to `LineHit`s before usages are
//! built from them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Byte span of a match within its line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// One regex match on one line of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineHit {
    /// Path relative to root, using '/' as separator
    pub path: String,

    /// Absolute path, used for validity and permission checks
    #[serde(skip)]
    pub abs_path: PathBuf,

    /// 1-based line number
    pub line: u32,

    /// Span of the match within `text`
    pub span: Span,

    /// Full line text without the trailing newline
    pub text: String,
}

impl LineHit {
    pub fn new(
        path: impl Into<String>,
        abs_path: impl Into<PathBuf>,
        line: u32,
        span: Span,
        text: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            abs_path: abs_path.into(),
            line,
            span,
            text: text.into(),
        }
    }

    /// The matched text, empty when the span does not fit the line.
    pub fn matched(&self) -> &str {
        self.text.get(self.span.start..self.span.end).unwrap_or("")
    }
}

/// Sort hits by path, line and column for stable output
pub fn sort_hits(hits: &mut [LineHit]) {
    hits.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then(a.line.cmp(&b.line))
            .then(a.span.cmp(&b.span))
    });
}
