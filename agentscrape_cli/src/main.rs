mod collector;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "agentscrape")]
#[command(about = "Collect real-estate agent contacts from directory pages")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch directory pages for a city and extract agents
    Scrape(Box<commands::scrape::ScrapeArgs>),
    /// Extract agents from saved directory pages
    Parse(commands::parse::ParseArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agentscrape=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.format.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    match &cli.command {
        Commands::Scrape(args) => commands::scrape::run(args.as_ref(), &format).await?,
        Commands::Parse(args) => commands::parse::run(args, &format)?,
    }

    Ok(())
}
