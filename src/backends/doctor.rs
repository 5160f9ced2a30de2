//! Doctor - Dependency checking

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::backends::rg::is_rg_available;
use crate::core::render::OutputFormat;

/// Dependency status
#[derive(Debug, Clone, Serialize)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    pub command: Option<String>,
    pub required: bool,
    pub notes: Option<String>,
}

impl DependencyStatus {
    /// One human-readable status line
    pub fn describe(&self) -> String {
        let status = if self.available {
            "✓".green()
        } else {
            "✗".red()
        };
        let required = if self.required {
            "required"
        } else {
            "optional"
        };

        let mut message = format!(
            "{} {} ({}) - {}",
            status,
            self.name,
            required,
            self.command
                .as_ref()
                .map(|c| format!("found: {}", c))
                .unwrap_or_else(|| "not found".to_string())
        );

        if let Some(notes) = &self.notes {
            message.push_str(&format!("\n  Note: {}", notes));
        }
        message
    }
}

/// Check all dependencies
pub fn check_dependencies() -> Vec<DependencyStatus> {
    let rg = is_rg_available();

    // ripgrep is optional: the built-in backend covers its absence
    vec![DependencyStatus {
        name: "ripgrep".to_string(),
        available: rg,
        command: rg.then(|| "rg".to_string()),
        required: false,
        notes: (!rg).then(|| {
            "Install: brew install ripgrep / cargo install ripgrep (built-in search is used meanwhile)"
                .to_string()
        }),
    }]
}

/// Run the doctor command
pub fn run_doctor(format: OutputFormat, pretty: bool) -> Result<()> {
    let deps = check_dependencies();

    match format {
        OutputFormat::Json => {
            let output = if pretty {
                serde_json::to_string_pretty(&deps)?
            } else {
                serde_json::to_string(&deps)?
            };
            println!("{}", output);
        }
        OutputFormat::Jsonl => {
            for dep in &deps {
                println!("{}", serde_json::to_string(dep)?);
            }
        }
        _ => {
            for dep in &deps {
                println!("{}", dep.describe());
            }
        }
    }

    if deps.iter().any(|d| d.required && !d.available) {
        eprintln!("\n⚠️  Some required dependencies are missing!");
    }

    Ok(())
}
