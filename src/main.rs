//! Stackprobe - Registration Validation CLI
//!
//! Probes a Llama Stack instance: discovers vector-io providers, attempts
//! each configured candidate registration, and reports the outcomes.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use stackprobe::probe::ProbeRunner;
use stackprobe::report::Reporter;
use stackprobe::stack::client::HttpStackClient;
use stackprobe::stack::traits::StackClient;
use stackprobe::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "stackprobe")]
#[command(about = "Registration validation probe for Llama Stack vector-io backends")]
struct Cli {
    /// Path to the YAML config file (default: stackprobe.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL (overrides config)
    #[arg(long, global = true, env = "STACKPROBE_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover providers and attempt every configured candidate registration
    Probe {
        /// Read back the vector-db registry afterwards and report presence
        #[arg(long)]
        verify: bool,

        /// Unregister the databases this run successfully created
        #[arg(long)]
        cleanup: bool,
    },

    /// List the providers the service exposes for a capability
    Providers {
        /// Capability to query (overrides config)
        #[arg(long)]
        capability: Option<String>,
    },

    /// Check the service's health endpoint
    Health,

    /// List the registered vector databases
    VectorDbs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing on stderr; stdout belongs to the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stackprobe=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let client = Arc::new(HttpStackClient::new(
        &config.base_url,
        config.api_token.clone(),
        Duration::from_secs(config.timeout_secs),
    )?);

    match cli.command {
        Commands::Probe { verify, cleanup } => run_probe(config, client, verify, cleanup).await,
        Commands::Providers { capability } => {
            let capability = capability.unwrap_or(config.capability);
            run_providers(client, &capability).await
        }
        Commands::Health => run_health(client).await,
        Commands::VectorDbs => run_vector_dbs(client).await,
    }
}

/// Run the full probe workflow and exit nonzero unless every candidate
/// registered against a reachable service.
async fn run_probe(
    config: Config,
    client: Arc<HttpStackClient>,
    verify: bool,
    cleanup: bool,
) -> Result<()> {
    tracing::info!(
        "Probing {} ({} candidate(s))",
        config.base_url,
        config.candidates.len()
    );

    let runner = ProbeRunner::new(client, config.capability, config.candidates);
    let mut reporter = Reporter::new(std::io::stdout());

    let summary = runner.run(&mut reporter).await?;

    if verify && summary.discovery_failure.is_none() {
        runner.verify(&summary, &mut reporter).await?;
    }
    if cleanup && summary.discovery_failure.is_none() {
        runner.cleanup(&summary, &mut reporter).await?;
    }

    if summary.discovery_failure.is_some() {
        bail!("Provider discovery failed");
    }
    if !summary.succeeded() {
        bail!("One or more candidate registrations failed");
    }
    Ok(())
}

async fn run_providers(client: Arc<HttpStackClient>, capability: &str) -> Result<()> {
    let providers = client
        .list_providers(capability)
        .await
        .context("Provider discovery failed")?;

    let mut reporter = Reporter::new(std::io::stdout());
    reporter.discovery_header(capability, providers.len())?;
    reporter.provider_list(&providers)?;
    Ok(())
}

async fn run_health(client: Arc<HttpStackClient>) -> Result<()> {
    let health = client.health().await.context("Health check failed")?;
    println!("Status: {}", health.status);
    Ok(())
}

async fn run_vector_dbs(client: Arc<HttpStackClient>) -> Result<()> {
    let dbs = client
        .list_vector_dbs()
        .await
        .context("Listing vector databases failed")?;

    let mut reporter = Reporter::new(std::io::stdout());
    reporter.vector_db_list(&dbs)?;
    Ok(())
}
