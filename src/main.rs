//! utree - group search usages into a tree
//!
//! utree provides:
//! - Whole-word search through ripgrep or a built-in walker
//! - Read/write access classification for variables
//! - Grouping by access, directory and file with merged duplicate lines
//! - Output as a tree, json, jsonl, md or a debug dump

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    cli::run(cli)
}

/// Log to stderr; RUST_LOG wins over the verbosity flags.
fn init_tracing(quiet: bool, verbose: bool) {
    let default = if verbose {
        "warn,usage_tree=debug,utree=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
