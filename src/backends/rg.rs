//! ripgrep integration
//!
//! Calls rg with --json and turns every submatch into a LineHit

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::backends::SearchOptions;
use crate::core::model::{sort_hits, LineHit, Span};
use crate::core::paths::{make_relative, resolve};
use crate::core::util::command_exists;
use crate::error::{Result, SearchError};

/// Check if ripgrep is available
pub fn is_rg_available() -> bool {
    command_exists("rg")
}

/// Run ripgrep and collect one hit per submatch
pub fn search_rg(root: &Path, pattern: &str, options: &SearchOptions) -> Result<Vec<LineHit>> {
    if !is_rg_available() {
        return Err(SearchError::BackendNotFound("ripgrep (rg)"));
    }

    let mut cmd = rg_command(root, pattern, options);
    debug!(?cmd, "running ripgrep");
    let output = cmd.output()?;

    // Exit code 1 means "no matches"; anything above is a real failure.
    if output.status.code().is_some_and(|code| code > 1) && output.stdout.is_empty() {
        return Err(SearchError::BackendFailed {
            tool: "rg",
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_rg_json(root, &stdout))
}

/// Build the rg invocation.
///
/// User rc files are ignored and matching is case sensitive: every submatch
/// has to spell a target name exactly.
fn rg_command(root: &Path, pattern: &str, options: &SearchOptions) -> Command {
    let mut cmd = Command::new("rg");
    cmd.args(["--json", "--no-config", "--case-sensitive"]);
    if options.hidden {
        cmd.arg("--hidden");
    }
    if !options.ignore {
        cmd.arg("--no-ignore");
    }
    cmd.arg("-e").arg(pattern);

    // Add scope paths
    if options.scopes.is_empty() {
        cmd.arg(root);
    } else {
        for scope in &options.scopes {
            cmd.arg(resolve(root, scope));
        }
    }
    cmd
}

/// Parse `rg --json` output into hits, skipping anything that is not a match
pub fn parse_rg_json(root: &Path, stdout: &str) -> Vec<LineHit> {
    let mut hits = Vec::new();

    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let v: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => continue,
        };

        if v.get("type").and_then(|t| t.as_str()) != Some("match") {
            continue;
        }

        let data = match v.get("data") {
            Some(d) => d,
            None => continue,
        };

        let path_text = match data
            .get("path")
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
        {
            Some(p) => p,
            None => continue,
        };

        let line_num = data
            .get("line_number")
            .and_then(|n| n.as_u64())
            .unwrap_or(1) as u32;

        // Lines that are not valid UTF-8 come as base64 `bytes` instead of `text`
        let Some(lines_text) = data
            .get("lines")
            .and_then(|l| l.get("text"))
            .and_then(|t| t.as_str())
        else {
            debug!(path = path_text, line = line_num, "skipping match on a non-UTF-8 line");
            continue;
        };

        let abs_path: PathBuf = resolve(root, Path::new(path_text));
        let relative_path =
            make_relative(&abs_path, root).unwrap_or_else(|| path_text.to_string());
        let text = lines_text.trim_end_matches(['\n', '\r']);

        let submatches = data
            .get("submatches")
            .and_then(|s| s.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for submatch in submatches {
            let start = submatch.get("start").and_then(|n| n.as_u64());
            let end = submatch.get("end").and_then(|n| n.as_u64());
            let (Some(start), Some(end)) = (start, end) else {
                continue;
            };
            let hit = LineHit::new(
                relative_path.clone(),
                abs_path.clone(),
                line_num,
                Span::new(start as usize, end as usize),
                text,
            );
            if hit.matched().is_empty() {
                debug!(path = path_text, line = line_num, start, end, "skipping empty submatch");
                continue;
            }
            hits.push(hit);
        }
    }

    sort_hits(&mut hits);
    hits
}
