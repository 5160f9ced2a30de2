//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};

use usage_tree::backends::{Backend, SearchOptions};
use usage_tree::core::render::{OutputFormat, RenderConfig, Renderer};
use usage_tree::tree::TreeSettings;
use usage_tree::usages::convert::{SearchTarget, TargetDescriptor, TargetKind};
use usage_tree::usages::find::{find_usages, FindRequest};
use usage_tree::usages::rules::parse_rules;

/// utree - group the usages of a name into a tree.
#[derive(Parser, Debug)]
#[command(name = "utree")]
#[command(
    author,
    version,
    about,
    long_about = r#"utree searches for the usages of one or more names and groups them into a
tree: by read/write access, then by directory, then by file. Usages found twice
on the same line are merged into one entry.

Output formats:
- tree: indented tree with usage counts (default)
- json: the whole tree as one nested JSON document
- jsonl: one JSON object per usage, with the groups it sits in
- md: human-friendly Markdown
- debug: bracketed dump of the tree structure

Examples:
    utree usages count
    utree usages count --scope src --group-by dir,file
    utree usages parse --kind function --format jsonl
    utree doctor
"#
)]
pub struct Cli {
    /// Root directory for all operations.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "ROOT",
        long_help = "Root directory for all operations (defaults to the current directory).\n\n\
All paths shown in the tree are relative to this root, and --scope paths are\n\
interpreted relative to it."
    )]
    pub root: PathBuf,

    /// Output format (tree/json/jsonl/md/debug).
    #[arg(
        long,
        global = true,
        default_value = "tree",
        value_name = "FORMAT",
        long_help = "Select the output format.\n\n\
Supported values:\n\
- tree (default)\n\
- json\n\
- jsonl\n\
- md (markdown)\n\
- debug\n\n\
Tip: Prefer jsonl when you want stable, line-oriented output for piping."
    )]
    pub format: String,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (errors only on stderr).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Only log errors. Results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable debug logging on stderr. RUST_LOG, when set, takes precedence."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on tree/md/debug formats."
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the usages of one or more names and group them.
    #[command(
        long_about = "Search ROOT (or each --scope) for whole-word occurrences of NAME and\n\
group them into a tree.\n\n\
When every NAME is a variable (the default kind), each usage is classified as\n\
a read, a write or both, and the `type` rule groups by that access.\n\n\
Examples:\n\
  utree usages count\n\
  utree usages width --additional set_width --scope src\n\
  utree usages Parser --kind type --group-by file\n"
    )]
    Usages {
        /// Names to find usages of.
        #[arg(value_name = "NAME", required = true, num_args = 1..)]
        names: Vec<String>,

        /// Additional names whose usages count as usages of NAME.
        #[arg(
            long,
            value_name = "NAME",
            long_help = "Additional names searched along with NAME, e.g. the accessors of a\n\
field. May be repeated."
        )]
        additional: Vec<String>,

        /// What NAME is (variable/function/type/text).
        #[arg(
            long,
            default_value = "variable",
            value_name = "KIND",
            long_help = "What kind of element NAME is.\n\n\
Supported values: variable (default), function, type, text.\n\n\
Only variables get read/write access classification."
        )]
        kind: String,

        /// Limit search to paths under ROOT.
        #[arg(
            long,
            value_name = "PATH",
            long_help = "Limit the search to a file or directory under ROOT. May be repeated.\n\n\
If omitted, ROOT is searched."
        )]
        scope: Vec<PathBuf>,

        /// Grouping rules, outermost first (type,dir,file).
        #[arg(
            long,
            env = "UTREE_GROUP_BY",
            value_delimiter = ',',
            default_value = "type,dir,file",
            value_name = "RULES",
            long_help = "Comma-separated grouping rules, outermost first.\n\n\
Supported rules:\n\
- type: read/write access (variables only)\n\
- dir: containing directory\n\
- file: containing file"
        )]
        group_by: Vec<String>,

        /// Keep usages on the same line as separate entries.
        #[arg(
            long,
            env = "UTREE_NO_MERGE",
            long_help = "Do not merge usages that fall on the same line of the same file."
        )]
        no_merge: bool,

        /// Maximum number of hits to group.
        #[arg(
            long,
            env = "UTREE_MAX_USAGES",
            value_name = "N",
            long_help = "Stop after N hits. A warning is logged when hits are dropped."
        )]
        max_usages: Option<usize>,

        /// Search backend (auto/rg/builtin).
        #[arg(
            long,
            env = "UTREE_BACKEND",
            default_value = "auto",
            value_name = "BACKEND",
            long_help = "Search backend.\n\n\
Supported values:\n\
- auto (default): ripgrep when installed, builtin otherwise\n\
- rg: ripgrep, fails when it is not installed\n\
- builtin: in-process walker"
        )]
        backend: String,

        /// Include hidden files/directories (dotfiles).
        #[arg(long)]
        hidden: bool,

        /// Disable .gitignore and other ignore rules.
        #[arg(long)]
        no_ignore: bool,

        /// List the searched names above the usages.
        #[arg(long)]
        show_targets: bool,

        /// Drop usages whose file no longer exists.
        #[arg(long)]
        purge_invalid: bool,
    },

    /// Check external dependencies.
    #[command(long_about = "Check whether ripgrep is installed.\n\n\
utree works without it by falling back to the built-in backend.")]
    Doctor,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    // Parse output format
    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;
    let render_config = RenderConfig::new(format)
        .with_pretty(cli.pretty)
        .with_color(!cli.no_color);

    // Get absolute root path
    let root = cli.root.canonicalize().unwrap_or(cli.root);

    match cli.command {
        Commands::Usages {
            names,
            additional,
            kind,
            scope,
            group_by,
            no_merge,
            max_usages,
            backend,
            hidden,
            no_ignore,
            show_targets,
            purge_invalid,
        } => {
            let kind: TargetKind = kind.parse()?;
            let primary: Vec<SearchTarget> = names
                .into_iter()
                .map(|n| SearchTarget::new(n, kind))
                .collect();
            let additional: Vec<SearchTarget> = additional
                .into_iter()
                .map(|n| SearchTarget::new(n, TargetKind::Text))
                .collect();

            let descriptor = TargetDescriptor::with_additional(primary, additional)?;

            let mut request = FindRequest::new(descriptor);
            request.rules = parse_rules(&group_by)?;
            request.backend = backend.parse::<Backend>()?;
            request.options = SearchOptions {
                scopes: scope,
                hidden,
                ignore: !no_ignore,
            };
            request.settings = TreeSettings {
                filter_duplicate_lines: !no_merge,
            };
            request.max_usages = max_usages;
            request.show_targets = show_targets;
            request.purge_invalid = purge_invalid;

            run_usages(&root, &request, render_config)
        }

        Commands::Doctor => usage_tree::backends::doctor::run_doctor(format, cli.pretty),
    }
}

fn run_usages(root: &Path, request: &FindRequest, render_config: RenderConfig) -> Result<()> {
    let tree = find_usages(root, request)
        .with_context(|| format!("failed to search {}", root.display()))?;

    let dump = if render_config.format == OutputFormat::Debug {
        tree.tree2string(tree.root(), 0, "\n")
    } else {
        String::new()
    };

    Renderer::with_config(render_config)
        .render_to(&tree.snapshot(), &dump, io::stdout().lock())
        .context("failed to write output")
}
