//! The `parse` subcommand: extracts agents from saved directory pages.

use std::path::{Path, PathBuf};

use agentscrape_lib::{parse_agents_from_html, AgentRecord};
use anyhow::{Context, Result};
use clap::Args;

use crate::collector::AgentCollector;
use crate::output::{print_agents, write_agents_file, OutputFormat};

/// Arguments for the `parse` subcommand.
#[derive(Args)]
pub struct ParseArgs {
    /// Saved directory page(s), read in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Also write the collected agents to this JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ParseArgs, format: &OutputFormat) -> Result<()> {
    let agents = parse_files(&args.files)?;

    if let Some(output) = &args.output {
        write_agents_file(output, &agents)?;
        eprintln!("Wrote {} agents to {}", agents.len(), output.display());
    }
    print_agents(&agents, format)
}

/// Parses each file and keeps agents not already seen in an earlier file.
fn parse_files(files: &[PathBuf]) -> Result<Vec<AgentRecord>> {
    let mut collector = AgentCollector::default();
    for path in files {
        let html = read_page(path)?;
        let records = parse_agents_from_html(&html);
        let found = records.len();
        let added = collector.absorb(records);
        tracing::info!(
            "{}: {} agents ({} new)",
            path.display(),
            found,
            added
        );
    }
    Ok(collector.into_agents())
}

/// Saved pages are not always valid UTF-8; invalid bytes are replaced.
fn read_page(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
