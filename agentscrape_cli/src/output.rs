use std::path::Path;

use agentscrape_lib::types::records_to_json;
use agentscrape_lib::{AgentRecord, PhoneEntry};
use anyhow::Result;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct AgentRow {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Phones")]
    #[serde(rename = "Phones")]
    phones: String,
    #[tabled(rename = "Sold")]
    #[serde(rename = "Sold")]
    sold: String,
    #[tabled(rename = "For Sale")]
    #[serde(rename = "For Sale")]
    for_sale: String,
}

// -- Row builders --

fn build_agent_rows(agents: &[AgentRecord]) -> Vec<AgentRow> {
    agents
        .iter()
        .map(|a| AgentRow {
            name: a.name.clone(),
            phones: phones_cell(&a.phones),
            sold: count_cell(a.sold),
            for_sale: count_cell(a.for_sale),
        })
        .collect()
}

fn phones_cell(phones: &[PhoneEntry]) -> String {
    phones
        .iter()
        .map(|p| format!("{}: {}", p.phone_type, p.number))
        .collect::<Vec<_>>()
        .join("; ")
}

fn count_cell(count: Option<u64>) -> String {
    count.map(|c| c.to_string()).unwrap_or_default()
}

// -- Table output --

pub fn print_agents_table(agents: &[AgentRecord]) {
    println!("{}", Table::new(build_agent_rows(agents)));
}

// -- Markdown output --

pub fn print_agents_markdown(agents: &[AgentRecord]) {
    let mut table = Table::new(build_agent_rows(agents));
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn print_agents_csv(agents: &[AgentRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_agent_rows(agents) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_json(agents: &[AgentRecord]) -> Result<()> {
    println!("{}", records_to_json(agents)?);
    Ok(())
}

pub fn print_agents(agents: &[AgentRecord], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_agents_table(agents),
        OutputFormat::Markdown => print_agents_markdown(agents),
        OutputFormat::Csv => print_agents_csv(agents)?,
        OutputFormat::Json => print_json(agents)?,
    }
    Ok(())
}

/// Writes the records as a pretty-printed JSON array.
pub fn write_agents_file(path: &Path, agents: &[AgentRecord]) -> Result<()> {
    let mut json = records_to_json(agents)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
