//! Backends module - search collaborators producing line hits
//!
//! Provides:
//! - rg: ripgrep integration
//! - scan: built-in walker and regex matcher
//! - doctor: dependency checking

pub mod doctor;
pub mod rg;
pub mod scan;

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::model::LineHit;
use crate::error::{Result, SearchError};

/// Which search backend produces hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// ripgrep when installed, built-in otherwise
    #[default]
    Auto,
    Rg,
    Builtin,
}

impl std::str::FromStr for Backend {
    type Err = SearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "rg" | "ripgrep" => Ok(Backend::Rg),
            "builtin" | "scan" => Ok(Backend::Builtin),
            _ => Err(SearchError::UnknownBackend(s.to_string())),
        }
    }
}

/// Where and how to search
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Paths to search, relative to root; empty means the whole root
    pub scopes: Vec<PathBuf>,

    /// Include hidden files
    pub hidden: bool,

    /// Respect .gitignore and .ignore files
    pub ignore: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            scopes: Vec::new(),
            hidden: false,
            ignore: true,
        }
    }
}

/// Search `root` for `pattern`, returning hits sorted by path, line and column
pub fn search(
    backend: Backend,
    root: &Path,
    pattern: &str,
    options: &SearchOptions,
) -> Result<Vec<LineHit>> {
    let backend = match backend {
        Backend::Auto if rg::is_rg_available() => Backend::Rg,
        Backend::Auto => Backend::Builtin,
        other => other,
    };
    debug!(?backend, pattern, "searching");

    match backend {
        Backend::Rg => rg::search_rg(root, pattern, options),
        _ => scan::search_builtin(root, pattern, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_backend_parse() {
        assert_eq!("auto".parse::<Backend>().unwrap(), Backend::Auto);
        assert_eq!("rg".parse::<Backend>().unwrap(), Backend::Rg);
        assert_eq!("RIPGREP".parse::<Backend>().unwrap(), Backend::Rg);
        assert_eq!("builtin".parse::<Backend>().unwrap(), Backend::Builtin);
    }

    #[test]
    fn test_backend_parse_invalid() {
        let err = "grep".parse::<Backend>().unwrap_err();
        assert!(matches!(err, SearchError::UnknownBackend(name) if name == "grep"));
    }

    #[test]
    fn test_auto_matches_builtin() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.rs"), "let total = 1;\ntotal += 2;\n").unwrap();

        let options = SearchOptions::default();
        let auto = search(Backend::Auto, temp.path(), r"\btotal\b", &options).unwrap();
        let builtin = search(Backend::Builtin, temp.path(), r"\btotal\b", &options).unwrap();

        let key = |hits: &[LineHit]| -> Vec<(String, u32, usize)> {
            hits.iter()
                .map(|h| (h.path.clone(), h.line, h.span.start))
                .collect()
        };
        assert_eq!(key(&auto), key(&builtin));
        assert_eq!(builtin.len(), 2);
    }
}
