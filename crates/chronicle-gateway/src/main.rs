//! CLI entry point for the chronicle gateway.
//!
//! Meant to be driven by the web layer as a subprocess: request bodies are
//! read as JSON from stdin and responses written as JSON to stdout. Handler
//! failures print `{"status", "detail"}` and exit non-zero.

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use chronicle_gateway::config::DEFAULT_PREFIX;
use chronicle_gateway::types::{ExploreRequest, SearchRequest};
use chronicle_gateway::{Gateway, GatewayError, Settings};

#[derive(Parser)]
#[command(name = "chronicle-gateway")]
#[command(about = "Read-only query gateway for the Chronicle historical knowledge graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix.
    #[arg(short, long, default_value = DEFAULT_PREFIX, global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Search persons and events (reads JSON from stdin).
    Search,
    /// Run a read-only Cypher query (reads JSON from stdin).
    Explore,
    /// List country and continent filter options.
    Filters,
    /// Autocomplete person and event names.
    Suggest {
        /// Name prefix, at least two characters.
        #[arg(long)]
        q: String,
    },
    /// Show one node and its neighbours.
    Infobox {
        /// Numeric node id.
        #[arg(long)]
        id: String,
    },
    /// Check database connectivity.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    let gateway = Gateway::connect(&settings).await;
    let gateway = match gateway {
        Ok(gateway) => gateway,
        Err(err) => fail(&err),
    };

    let outcome = match cli.command {
        Command::Search => match read_request::<SearchRequest>() {
            Ok(request) => render(gateway.search(request).await),
            Err(err) => Err(err),
        },
        Command::Explore => match read_request::<ExploreRequest>() {
            Ok(request) => render(gateway.explore(request).await),
            Err(err) => Err(err),
        },
        Command::Filters => render(gateway.search_filters().await),
        Command::Suggest { ref q } => render(gateway.suggestions(q).await),
        Command::Infobox { ref id } => render(gateway.infobox(id).await),
        Command::Health => render(Ok(gateway.health().await)),
    };

    match outcome {
        Ok(body) => println!("{body}"),
        Err(err) => fail(&err),
    }
    Ok(())
}

/// Parse the stdin body. Malformed JSON is the caller's fault.
fn read_request<T: serde::de::DeserializeOwned>() -> Result<T, GatewayError> {
    let input = std::io::read_to_string(std::io::stdin())
        .map_err(|e| GatewayError::Validation(format!("Failed to read request: {e}")))?;
    serde_json::from_str(&input)
        .map_err(|e| GatewayError::Validation(format!("Invalid request body: {e}")))
}

fn render<T: Serialize>(result: Result<T, GatewayError>) -> Result<String, GatewayError> {
    Ok(serde_json::to_string(&result?)?)
}

fn fail(err: &GatewayError) -> ! {
    println!("{}", err.to_body());
    std::process::exit(1);
}
