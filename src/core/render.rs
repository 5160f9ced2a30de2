//! Renderer module
//!
//! Renders a usage tree snapshot to different output formats: tree, json,
//! jsonl, md, debug

use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::io::Write;

use crate::core::util::plural;
use crate::tree::dump::{NodeSnapshot, SnapshotKind};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
    Jsonl,
    Markdown,
    Debug,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tree" => Ok(OutputFormat::Tree),
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "debug" => Ok(OutputFormat::Debug),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: false,
            color: true,
        }
    }
}

impl RenderConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// One usage with the labels of the groups it sits in
#[derive(Debug, Serialize)]
struct UsageRecord<'a> {
    groups: &'a [&'a str],
    usage: &'a str,
    valid: bool,
    read_only: bool,
    excluded: bool,
}

/// Renderer for tree snapshots
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a snapshot to a string.
    ///
    /// `dump` is the `tree2string` text, only used by the debug format.
    pub fn render(&self, snapshot: &NodeSnapshot, dump: &str) -> String {
        match self.config.format {
            OutputFormat::Tree => self.render_tree(snapshot),
            OutputFormat::Json => self.render_json(snapshot),
            OutputFormat::Jsonl => self.render_jsonl(snapshot),
            OutputFormat::Markdown => self.render_markdown(snapshot),
            OutputFormat::Debug => dump.to_string(),
        }
    }

    /// Render to a writer
    pub fn render_to<W: Write>(
        &self,
        snapshot: &NodeSnapshot,
        dump: &str,
        mut writer: W,
    ) -> std::io::Result<()> {
        let output = self.render(snapshot, dump);
        writer.write_all(output.as_bytes())?;
        if !output.is_empty() && !output.ends_with('\n') {
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.config.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Render as an indented tree with usage counts
    fn render_tree(&self, snapshot: &NodeSnapshot) -> String {
        let mut output = String::new();
        let count = snapshot.count.unwrap_or(0);
        output.push_str(&self.paint(&plural(count, "usage"), |s| s.bold()));
        output.push('\n');

        for child in &snapshot.children {
            self.render_tree_node(&mut output, child, 1);
        }
        output
    }

    fn render_tree_node(&self, output: &mut String, node: &NodeSnapshot, depth: usize) {
        output.push_str(&"  ".repeat(depth));
        let label = node.label.as_deref().unwrap_or("");

        match node.kind {
            SnapshotKind::Target => {
                output.push_str(&self.paint(label, |s| s.magenta().bold()));
            }
            SnapshotKind::Root | SnapshotKind::Group => {
                output.push_str(&self.paint(label, |s| s.cyan().bold()));
                let count = format!("({})", plural(node.count.unwrap_or(0), "usage"));
                output.push(' ');
                output.push_str(&self.paint(&count, |s| s.dimmed()));
            }
            SnapshotKind::Usage => {
                if node.valid {
                    output.push_str(label);
                } else {
                    output.push_str(&self.paint(label, |s| s.strikethrough()));
                }
            }
        }

        for flag in flags(node) {
            output.push(' ');
            output.push_str(&self.paint(&format!("[{flag}]"), |s| s.yellow()));
        }
        output.push('\n');

        for child in &node.children {
            self.render_tree_node(output, child, depth + 1);
        }
    }

    /// Render as a single nested JSON document
    fn render_json(&self, snapshot: &NodeSnapshot) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string())
        }
    }

    /// Render as JSON Lines (one object per usage)
    fn render_jsonl(&self, snapshot: &NodeSnapshot) -> String {
        let mut lines = Vec::new();
        snapshot.for_each_usage(|groups, usage| {
            let record = UsageRecord {
                groups,
                usage: usage.label.as_deref().unwrap_or(""),
                valid: usage.valid,
                read_only: usage.read_only,
                excluded: usage.excluded,
            };
            let line = if self.config.pretty {
                serde_json::to_string_pretty(&record)
            } else {
                serde_json::to_string(&record)
            };
            if let Ok(line) = line {
                lines.push(line);
            }
        });
        lines.join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as Markdown, one heading level per group
    fn render_markdown(&self, snapshot: &NodeSnapshot) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "# Usages ({})\n\n",
            snapshot.count.unwrap_or(0)
        ));

        let targets: Vec<_> = snapshot
            .children
            .iter()
            .filter(|c| c.kind == SnapshotKind::Target)
            .collect();
        if !targets.is_empty() {
            output.push_str("## Targets\n\n");
            for target in targets {
                output.push_str(&format!("- `{}`\n", target.label.as_deref().unwrap_or("")));
            }
            output.push('\n');
        }

        for child in &snapshot.children {
            self.render_markdown_node(&mut output, child, 2);
        }
        output
    }

    fn render_markdown_node(&self, output: &mut String, node: &NodeSnapshot, level: usize) {
        let label = node.label.as_deref().unwrap_or("");
        match node.kind {
            SnapshotKind::Target => {}
            SnapshotKind::Usage => {
                output.push_str(&format!("- `{}`", label));
                for flag in flags(node) {
                    output.push_str(&format!(" _{}_", flag));
                }
                output.push('\n');
            }
            SnapshotKind::Root | SnapshotKind::Group => {
                let hashes = "#".repeat(level.min(6));
                output.push_str(&format!(
                    "{} {} ({})\n\n",
                    hashes,
                    label,
                    plural(node.count.unwrap_or(0), "usage")
                ));
                let mut listed = false;
                for child in &node.children {
                    if child.kind == SnapshotKind::Usage {
                        self.render_markdown_node(output, child, level + 1);
                        listed = true;
                    }
                }
                if listed {
                    output.push('\n');
                }
                for child in &node.children {
                    if child.kind != SnapshotKind::Usage {
                        self.render_markdown_node(output, child, level + 1);
                    }
                }
            }
        }
    }
}

fn flags(node: &NodeSnapshot) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if node.kind == SnapshotKind::Target {
        return flags;
    }
    if !node.valid {
        flags.push("invalid");
    }
    if node.read_only {
        flags.push("read-only");
    }
    if node.excluded && node.kind == SnapshotKind::Usage {
        flags.push("excluded");
    }
    flags
}
