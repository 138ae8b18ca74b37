//! The `scrape` subcommand: walks a city's directory pages and collects agents.

use std::path::PathBuf;
use std::time::Duration;

use agentscrape_lib::{parse_agents_from_html, validation, AgentRecord};
use anyhow::{bail, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use realtor_api::{Client, ClientOptions, DirectoryQuery, ProxyConfig, Query};
use tokio::time::sleep;

use crate::collector::AgentCollector;
use crate::output::{print_agents, write_agents_file, OutputFormat};

const PROXY_USER_ENV: &str = "OXY_USER";
const PROXY_PASS_ENV: &str = "OXY_PASS";
const BASE_URL_ENV: &str = "AGENTSCRAPE_BASE_URL";

/// Arguments for the `scrape` subcommand.
#[derive(Args)]
pub struct ScrapeArgs {
    /// City name or slug (e.g. "vancouver", "san diego")
    #[arg(long)]
    pub city: String,

    /// Two-letter state code (e.g. WA)
    #[arg(long)]
    pub state: String,

    /// Maximum number of directory pages to fetch (1-500)
    #[arg(long, default_value = "10")]
    pub max_pages: u32,

    /// JSON file to write the collected agents to
    #[arg(short, long, default_value = "agents.json")]
    pub output: PathBuf,

    /// Minimum delay between pages, in seconds
    #[arg(long, default_value = "1.0")]
    pub delay_min: f64,

    /// Maximum delay between pages, in seconds
    #[arg(long, default_value = "2.5")]
    pub delay_max: f64,

    /// Proxy host
    #[arg(long, default_value = "unblock.oxylabs.io")]
    pub proxy_host: String,

    /// Proxy port
    #[arg(long, default_value = "60000")]
    pub proxy_port: u16,

    /// Proxy username (falls back to OXY_USER)
    #[arg(long)]
    pub proxy_user: Option<String>,

    /// Proxy password (falls back to OXY_PASS)
    #[arg(long)]
    pub proxy_pass: Option<String>,

    /// Connect directly instead of through the proxy
    #[arg(long)]
    pub no_proxy: bool,

    /// Geo-location the proxy should exit from
    #[arg(long, default_value = "United States")]
    pub geo: String,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Directory agent type filter
    #[arg(long, default_value = realtor_api::DEFAULT_AGENT_TYPE)]
    pub agent_type: String,

    /// Override the site base URL (falls back to AGENTSCRAPE_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,
}

pub async fn run(args: &ScrapeArgs, format: &OutputFormat) -> Result<()> {
    let city = validation::validate_city(&args.city)?;
    let state = validation::validate_state(&args.state)?;
    let max_pages = validation::validate_max_pages(args.max_pages)?;
    let delay = validation::validate_delay_range(args.delay_min, args.delay_max)?;

    let options = client_options(args, |key| std::env::var(key).ok())?;
    let client = match args
        .base_url
        .clone()
        .or_else(|| std::env::var(BASE_URL_ENV).ok())
    {
        Some(url) => Client::with_base_url(&url),
        None => Client::new(),
    }
    .with_options(options);

    let query = DirectoryQuery::new(&city, &state).with_agent_type(&args.agent_type);
    eprintln!(
        "Scraping up to {} pages for {}, {}",
        max_pages, city, state
    );

    let agents = scrape_pages(&client, &query, max_pages, delay).await;

    write_agents_file(&args.output, &agents)?;
    eprintln!("Wrote {} agents to {}", agents.len(), args.output.display());
    print_agents(&agents, format)
}

/// Builds transport options from the flags, reading missing proxy
/// credentials through `env`.
fn client_options(
    args: &ScrapeArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientOptions> {
    let mut options = ClientOptions {
        verify_tls: !args.insecure,
        ..ClientOptions::default()
    };
    if args.no_proxy {
        return Ok(options);
    }

    let username = args
        .proxy_user
        .clone()
        .or_else(|| env(PROXY_USER_ENV))
        .filter(|s| !s.is_empty());
    let password = args
        .proxy_pass
        .clone()
        .or_else(|| env(PROXY_PASS_ENV))
        .filter(|s| !s.is_empty());
    let (Some(username), Some(password)) = (username, password) else {
        bail!(
            "proxy credentials missing: pass --proxy-user/--proxy-pass, set {}/{}, or use --no-proxy",
            PROXY_USER_ENV,
            PROXY_PASS_ENV
        );
    };

    options.proxy = Some(ProxyConfig {
        host: args.proxy_host.clone(),
        port: args.proxy_port,
        username,
        password,
    });
    options.geo_location = Some(args.geo.clone()).filter(|g| !g.trim().is_empty());
    Ok(options)
}

/// Fetches pages 1..=`max_pages` and accumulates agents not seen on an
/// earlier page.
///
/// Stops early on a failed request, a non-listing response, or a page that
/// adds no new agents.
pub async fn scrape_pages(
    client: &Client,
    query: &DirectoryQuery,
    max_pages: u32,
    delay: (f64, f64),
) -> Vec<AgentRecord> {
    let mut collector = AgentCollector::default();

    let pb = ProgressBar::new(u64::from(max_pages));
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}") {
        pb.set_style(style);
    }

    for page in 1..=max_pages {
        let page_query = query.clone().with_page(page);
        let html = match client.get_directory_page(&page_query).await {
            Ok(html) => html,
            Err(e) if e.is_transport() => {
                tracing::warn!("Page {}: request failed, stopping: {}", page, e);
                break;
            }
            Err(e) => {
                tracing::info!("Page {}: {}; stopping", page, e);
                break;
            }
        };

        let records = parse_agents_from_html(&html);
        let found = records.len();
        let added = collector.absorb(records);
        tracing::debug!("Page {}: extracted {} agents", page, found);

        if added == 0 {
            if page == 1 {
                tracing::warn!("No agents found on page 1; site markup may have changed");
            } else {
                tracing::info!("Page {}: no new agents; stopping", page);
            }
            break;
        }

        tracing::info!(
            "Page {}: {} new agents ({} total)",
            page,
            added,
            collector.len()
        );
        pb.set_message(format!("{} agents", collector.len()));
        pb.inc(1);

        if page < max_pages {
            sleep(random_delay(delay)).await;
        }
    }

    pb.finish_and_clear();
    collector.into_agents()
}

fn random_delay((min, max): (f64, f64)) -> Duration {
    if max <= min {
        return Duration::from_secs_f64(min);
    }
    Duration::from_secs_f64(rand::thread_rng().gen_range(min..=max))
}
