//! Built-in search backend
//!
//! Walks files with the ignore crate and matches each line with a regex. With
//! the `parallel` feature files are searched on the rayon pool; hits are always
//! returned to a single caller that owns the tree.

use ignore::WalkBuilder;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backends::SearchOptions;
use crate::core::model::{sort_hits, LineHit, Span};
use crate::core::paths::{make_relative, normalize_path, resolve};
use crate::error::Result;

/// Collect the files to search under root (or each scope)
pub fn collect_files(root: &Path, options: &SearchOptions) -> Vec<PathBuf> {
    let starts: Vec<PathBuf> = if options.scopes.is_empty() {
        vec![root.to_path_buf()]
    } else {
        options.scopes.iter().map(|s| resolve(root, s)).collect()
    };

    let mut files = Vec::new();
    for start in starts {
        let mut builder = WalkBuilder::new(&start);
        builder
            .hidden(!options.hidden)
            .ignore(options.ignore)
            .git_ignore(options.ignore)
            .git_global(options.ignore)
            .git_exclude(options.ignore)
            .require_git(false);

        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            if entry.file_type().is_some_and(|t| t.is_file()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Search one file, yielding a hit per regex match
pub fn search_file(root: &Path, path: &Path, regex: &Regex) -> Vec<LineHit> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(err) => {
            debug!(path = %path.display(), %err, "skipping unreadable file");
            return Vec::new();
        }
    };

    let relative = make_relative(path, root).unwrap_or_else(|| normalize_path(path));
    let mut hits = Vec::new();
    for (index, line) in content.lines().enumerate() {
        for m in regex.find_iter(line) {
            hits.push(LineHit::new(
                relative.clone(),
                path,
                index as u32 + 1,
                Span::new(m.start(), m.end()),
                line,
            ));
        }
    }
    hits
}

/// Run the built-in search
pub fn search_builtin(root: &Path, pattern: &str, options: &SearchOptions) -> Result<Vec<LineHit>> {
    let regex = Regex::new(pattern)?;
    let files = collect_files(root, options);
    debug!(files = files.len(), "searching with built-in backend");

    #[cfg(feature = "parallel")]
    let mut hits: Vec<LineHit> = {
        use rayon::prelude::*;
        files
            .par_iter()
            .flat_map_iter(|path| search_file(root, path, &regex))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let mut hits: Vec<LineHit> = files
        .iter()
        .flat_map(|path| search_file(root, path, &regex))
        .collect();

    sort_hits(&mut hits);
    Ok(hits)
}
