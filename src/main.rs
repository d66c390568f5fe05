mod config;
mod fetch;
mod llm;
mod search;
mod timeline;

pub const USER_AGENT: &str = concat!("chronicle/", env!("CARGO_PKG_VERSION"));

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Client;
use tracing::info;

use config::{Config, Overrides};
use llm::LlmClient;
use search::{SearchBackend, SearxngClient};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum redirect hops before aborting.
const MAX_REDIRECTS: usize = 5;

#[derive(Parser)]
#[command(name = "chronicle", version, about = "Research a topic and render it as an event timeline")]
struct Cli {
    /// Path to the settings file (default: ~/.config/chronicle/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Chat-completion endpoint override
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Model name override
    #[arg(long, global = true)]
    model: Option<String>,

    /// API key override
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// SearXNG instance URL override
    #[arg(long, global = true)]
    searxng_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate an event timeline for a query
    Timeline {
        query: String,
        /// Emit the timeline as JSON instead of markdown
        #[arg(long)]
        json: bool,
        /// Skip the SearXNG fan-out and rely on the model alone
        #[arg(long)]
        no_search: bool,
    },
    /// Detailed analysis of a single event
    Details {
        query: String,
        #[arg(long)]
        no_search: bool,
    },
    /// Run a single SearXNG query and print the ranked results
    Search { query: String },
    /// Fetch a cited article and print its readable text
    Fetch { url: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chronicle=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;

    match cli.command {
        Command::Timeline { ref query, json, no_search } => {
            let config = load_config(&cli, no_search)?;
            let (llm, searxng) = build_clients(&http, &config)?;

            let data = timeline::generate_timeline(searxng.as_ref(), &llm, query).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print!("{}", timeline::render_timeline(query, &data));
            }
        }
        Command::Details { ref query, no_search } => {
            let config = load_config(&cli, no_search)?;
            let (llm, searxng) = build_clients(&http, &config)?;

            let text = timeline::event_details(searxng.as_ref(), &llm, query).await?;
            println!("{text}");
        }
        Command::Search { ref query } => {
            let config = load_config(&cli, false)?;
            let Some(searxng_config) = &config.searxng else {
                return Err("search is not configured (set SEARXNG_URL, the settings file, or --searxng-url)".into());
            };
            let client = SearxngClient::new(http.clone(), searxng_config);

            let set = client.search(query, searxng_config.num_results).await?;
            for (index, result) in set.results.iter().enumerate() {
                println!("[{}] {}", index + 1, result.title);
                println!("    {}", result.url);
                if !result.content.is_empty() {
                    println!("    {}", result.content);
                }
            }
            info!(results = set.results.len(), "search complete");
        }
        Command::Fetch { ref url } => {
            let text = fetch::fetch_page_text(&http, url).await?;
            println!("{text}");
        }
    }

    Ok(())
}

fn load_config(cli: &Cli, no_search: bool) -> Result<Config, config::ConfigError> {
    let overrides = Overrides {
        endpoint: cli.endpoint.clone(),
        model: cli.model.clone(),
        api_key: cli.api_key.clone(),
        searxng_url: cli.searxng_url.clone(),
        no_search,
    };
    config::load(cli.config.as_deref(), overrides)
}

fn build_clients(
    http: &Client,
    config: &Config,
) -> Result<(LlmClient, Option<SearxngClient>), llm::LlmError> {
    let llm = LlmClient::new(http.clone(), &config.llm)?;

    let searxng = config
        .searxng
        .as_ref()
        .map(|searxng_config| SearxngClient::new(http.clone(), searxng_config));
    if searxng.is_none() {
        info!("search disabled; timeline will rely on the model alone");
    }

    Ok((llm, searxng))
}
