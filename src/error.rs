//! Errors raised by the search side of the pipeline
//!
//! The tree itself has no error type: misuse panics and lost resources are
//! reported through node validity.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    /// A required external search tool is not installed.
    #[error("{0} is not installed")]
    BackendNotFound(&'static str),

    /// Unknown search backend name.
    #[error("unknown backend: {0} (expected auto, rg or builtin)")]
    UnknownBackend(String),

    /// Unknown grouping rule name.
    #[error("unknown grouping rule: {0} (expected type, dir or file)")]
    UnknownRule(String),

    /// Unknown target kind name.
    #[error("unknown target kind: {0} (expected variable, function, type or text)")]
    UnknownTargetKind(String),

    /// A search needs at least one primary target.
    #[error("no search targets given")]
    EmptyTargets,

    /// Search tool exited with an error.
    #[error("{tool} failed: {message}")]
    BackendFailed { tool: &'static str, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid search pattern.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
